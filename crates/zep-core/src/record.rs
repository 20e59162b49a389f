//! Execution records grouped from CSV rows, and failure-report items.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ExecutionStatus;

/// One ordered test step attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: String,
    pub data: String,
    /// Rendered expected-result text (`"Expected: …"`), empty when the
    /// source row had none.
    pub result: String,
}

/// A single execution to create in Zephyr, grouped from one or more CSV rows.
///
/// Built once at load time; the only mutation after construction is step
/// accumulation while loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub issue_key: String,
    pub cycle_name: String,
    pub folder_name: String,
    pub version_name: String,
    pub component_name: String,
    pub status: ExecutionStatus,
    pub executed_on: String,
    pub executed_by: String,
    pub assigned_to: String,
    pub comment: String,
    pub steps: Vec<StepRecord>,
}

/// A failed record plus the reason, collected for the end-of-run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureItem {
    pub record: ExecutionRecord,
    pub failure_reason: String,
    /// Set when an execution was created and then deleted in compensation.
    pub execution_id: Option<String>,
}

impl FailureItem {
    #[must_use]
    pub fn new(record: ExecutionRecord, reason: impl Into<String>) -> Self {
        Self {
            record,
            failure_reason: reason.into(),
            execution_id: None,
        }
    }

    #[must_use]
    pub fn with_execution_id(
        record: ExecutionRecord,
        reason: impl Into<String>,
        execution_id: impl Into<String>,
    ) -> Self {
        Self {
            record,
            failure_reason: reason.into(),
            execution_id: Some(execution_id.into()),
        }
    }

    /// Flatten to named columns for the failure report. Steps serialize as
    /// JSON text; `execution_id` is present only when compensation ran.
    #[must_use]
    pub fn to_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        let r = &self.record;
        fields.insert("issue_key".into(), r.issue_key.clone());
        fields.insert("cycle_name".into(), r.cycle_name.clone());
        fields.insert("folder_name".into(), r.folder_name.clone());
        fields.insert("version_name".into(), r.version_name.clone());
        fields.insert("component_name".into(), r.component_name.clone());
        fields.insert("status".into(), r.status.to_string());
        fields.insert("executed_on".into(), r.executed_on.clone());
        fields.insert("executed_by".into(), r.executed_by.clone());
        fields.insert("assigned_to".into(), r.assigned_to.clone());
        fields.insert("comment".into(), r.comment.clone());
        fields.insert(
            "steps".into(),
            serde_json::to_string(&r.steps).unwrap_or_default(),
        );
        fields.insert("failure_reason".into(), self.failure_reason.clone());
        if let Some(id) = &self.execution_id {
            fields.insert("execution_id".into(), id.clone());
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ExecutionRecord {
        ExecutionRecord {
            issue_key: "GCTEST-94808".into(),
            cycle_name: "Sprint1".into(),
            folder_name: String::new(),
            version_name: "Unscheduled".into(),
            component_name: String::new(),
            status: ExecutionStatus::Pass,
            executed_on: String::new(),
            executed_by: String::new(),
            assigned_to: String::new(),
            comment: String::new(),
            steps: vec![StepRecord {
                step: "Open the login page".into(),
                data: String::new(),
                result: "Expected: form renders".into(),
            }],
        }
    }

    #[test]
    fn failure_fields_cover_record_and_reason() {
        let item = FailureItem::new(record(), "Issue not found");
        let fields = item.to_fields();
        assert_eq!(fields["issue_key"], "GCTEST-94808");
        assert_eq!(fields["status"], "PASS");
        assert_eq!(fields["failure_reason"], "Issue not found");
        assert!(!fields.contains_key("execution_id"));
        assert!(fields["steps"].contains("Open the login page"));
    }

    #[test]
    fn compensated_failure_carries_execution_id() {
        let item = FailureItem::with_execution_id(
            record(),
            "Could not execute execution (deleted)",
            "8841",
        );
        let fields = item.to_fields();
        assert_eq!(fields["execution_id"], "8841");
        assert_eq!(fields["failure_reason"], "Could not execute execution (deleted)");
    }
}
