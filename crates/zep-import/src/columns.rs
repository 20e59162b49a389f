//! Header-driven column access with case-insensitive aliasing.
//!
//! Zephyr CSV exports are inconsistent about column naming ("Issue Key" vs
//! "IssueKey", "ExecutionStatus" vs "Status"); every field is looked up
//! through an alias list, first non-empty value wins.

use csv::StringRecord;

/// Normalize a header cell for matching: strip a UTF-8 BOM, trim, lowercase.
fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Pre-normalized headers for one CSV file.
pub(crate) struct Headers(Vec<String>);

impl Headers {
    pub(crate) fn new(headers: &StringRecord) -> Self {
        Self(headers.iter().map(normalize_header).collect())
    }
}

/// One data row viewed through the normalized headers.
pub(crate) struct RowView<'a> {
    headers: &'a Headers,
    record: &'a StringRecord,
}

impl<'a> RowView<'a> {
    pub(crate) const fn new(headers: &'a Headers, record: &'a StringRecord) -> Self {
        Self { headers, record }
    }

    /// First non-empty trimmed value under any of the aliases, else `default`.
    pub(crate) fn pick(&self, aliases: &[&str], default: &str) -> String {
        for alias in aliases {
            let alias = alias.trim().to_lowercase();
            for (idx, header) in self.headers.0.iter().enumerate() {
                if *header == alias {
                    if let Some(value) = self.record.get(idx) {
                        let value = value.trim();
                        if !value.is_empty() {
                            return value.to_string();
                        }
                    }
                }
            }
        }
        default.to_string()
    }
}
