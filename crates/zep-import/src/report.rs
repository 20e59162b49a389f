//! End-of-run failure report.
//!
//! Columns are the sorted union of field names across all failure items
//! (the `execution_id` column appears only when some record reached
//! compensation), plus a `failure_reason` for every row.

use std::collections::BTreeSet;
use std::path::Path;

use zep_core::FailureItem;

use crate::error::ImportError;

/// Write the failure report CSV. A run with no failures writes nothing.
///
/// # Errors
///
/// Returns [`ImportError`] if the file cannot be created or written.
pub fn write_failure_report(
    items: &[FailureItem],
    path: impl AsRef<Path>,
) -> Result<(), ImportError> {
    if items.is_empty() {
        return Ok(());
    }

    let rows: Vec<_> = items.iter().map(FailureItem::to_fields).collect();
    let columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|fields| fields.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(&columns)?;
    for fields in &rows {
        writer.write_record(
            columns
                .iter()
                .map(|column| fields.get(*column).map_or("", String::as_str)),
        )?;
    }
    writer.flush().map_err(ImportError::Io)?;

    tracing::info!(
        path = %path.as_ref().display(),
        failures = items.len(),
        "failure report written",
    );
    Ok(())
}
