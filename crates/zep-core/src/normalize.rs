//! String and date normalization shared across the import and client crates.

use chrono::{NaiveDate, NaiveDateTime};

/// Trim and collapse internal whitespace runs to single spaces.
#[must_use]
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a user display name from the CSV export.
///
/// Jira exports suffix deactivated accounts with `(Inactive)`; the directory
/// lists them without it. Strips the suffix and collapses whitespace.
#[must_use]
pub fn normalize_user_name(name: &str) -> String {
    let stripped = name.replace("(Inactive)", "").replace("(inactive)", "");
    normalize_whitespace(&stripped)
}

/// Datetime formats seen across Zephyr CSV exports. Order matters: the first
/// format that parses wins.
const DATETIME_FORMATS: &[&str] = &[
    "%m-%d-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d/%b/%y %I:%M %p",
    "%d/%b/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d/%b/%y %H:%M",
];

/// Parse an executed-on timestamp into epoch milliseconds.
///
/// Naive timestamps are interpreted as UTC. Returns `None` when no known
/// format matches; callers omit the field rather than failing the record.
#[must_use]
pub fn parse_date_to_millis(date_str: &str) -> Option<i64> {
    let date_str = date_str.trim();
    if date_str.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    // Date-only exports ("2024-03-01") map to midnight.
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc().timestamp_millis())
}
