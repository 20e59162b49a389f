//! Execution status table.
//!
//! Zephyr Squad identifies execution statuses by fixed numeric ids. Parsing
//! is total: any status string the table does not know folds to
//! [`ExecutionStatus::Unknown`], which maps to the UNEXECUTED id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution status as recorded in the source CSV.
///
/// ```text
/// PASS → 1, FAIL → 2, WIP → 3, BLOCKED → 4, UNEXECUTED → -1, unknown → -1
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pass,
    Fail,
    Wip,
    Blocked,
    Unexecuted,
    /// Any status string outside the fixed table; carries the raw input.
    Unknown(String),
}

impl ExecutionStatus {
    /// Parse a raw status string, case-insensitively. Never fails.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PASS" => Self::Pass,
            "FAIL" => Self::Fail,
            "WIP" => Self::Wip,
            "BLOCKED" => Self::Blocked,
            "UNEXECUTED" => Self::Unexecuted,
            _ => Self::Unknown(raw.trim().to_string()),
        }
    }

    /// The numeric status id Zephyr expects in execution updates.
    #[must_use]
    pub const fn status_id(&self) -> i64 {
        match self {
            Self::Pass => 1,
            Self::Fail => 2,
            Self::Wip => 3,
            Self::Blocked => 4,
            Self::Unexecuted | Self::Unknown(_) => -1,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Wip => "WIP",
            Self::Blocked => "BLOCKED",
            Self::Unexecuted => "UNEXECUTED",
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_map_to_fixed_ids() {
        assert_eq!(ExecutionStatus::from_raw("PASS").status_id(), 1);
        assert_eq!(ExecutionStatus::from_raw("FAIL").status_id(), 2);
        assert_eq!(ExecutionStatus::from_raw("WIP").status_id(), 3);
        assert_eq!(ExecutionStatus::from_raw("BLOCKED").status_id(), 4);
        assert_eq!(ExecutionStatus::from_raw("UNEXECUTED").status_id(), -1);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(ExecutionStatus::from_raw("pass"), ExecutionStatus::Pass);
        assert_eq!(ExecutionStatus::from_raw("Blocked"), ExecutionStatus::Blocked);
        assert_eq!(ExecutionStatus::from_raw("  wip "), ExecutionStatus::Wip);
    }

    #[test]
    fn unknown_status_folds_to_unexecuted_id() {
        let status = ExecutionStatus::from_raw("Descoped");
        assert_eq!(status, ExecutionStatus::Unknown("Descoped".to_string()));
        assert_eq!(status.status_id(), -1);
        assert_eq!(status.as_str(), "Descoped");
    }

    #[test]
    fn display_matches_table_spelling() {
        assert_eq!(ExecutionStatus::from_raw("pass").to_string(), "PASS");
        assert_eq!(ExecutionStatus::from_raw("junk").to_string(), "junk");
    }
}
