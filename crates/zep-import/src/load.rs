//! CSV → execution record loading.
//!
//! Streams rows, keeps only allow-listed issue keys, and groups rows into
//! one record per execution: by the export's execution id when present,
//! else by the issue+cycle+folder composite. Rows after the first for a key
//! contribute only steps, in file order.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use zep_core::{ExecutionRecord, ExecutionStatus, StepRecord};

use crate::columns::{Headers, RowView};
use crate::error::ImportError;

/// Load and group executions from a CSV file.
///
/// # Errors
///
/// Returns [`ImportError`] if the file cannot be opened or a row cannot be
/// parsed.
pub fn load_executions_file(
    path: impl AsRef<Path>,
    allow_list: &HashSet<String>,
) -> Result<Vec<ExecutionRecord>, ImportError> {
    let file = std::fs::File::open(path)?;
    load_executions(file, allow_list)
}

/// Load and group executions from any CSV reader.
///
/// # Errors
///
/// Returns [`ImportError`] if the header or a row cannot be parsed.
pub fn load_executions<R: Read>(
    reader: R,
    allow_list: &HashSet<String>,
) -> Result<Vec<ExecutionRecord>, ImportError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = Headers::new(csv_reader.headers()?);

    let mut records: Vec<ExecutionRecord> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for row in csv_reader.records() {
        let row = row?;
        let view = RowView::new(&headers, &row);

        let issue_key = view.pick(&["issue key", "issuekey"], "");
        if issue_key.is_empty() || !allow_list.contains(&issue_key) {
            continue;
        }

        let cycle_name = view.pick(&["cyclename", "test cycle"], "Ad hoc");
        let folder_name = view.pick(&["foldername", "folder"], "");

        let execution_id = view.pick(&["executionid", "execution id"], "");
        let unique_key = if execution_id.is_empty() {
            format!("{issue_key}_{cycle_name}_{folder_name}")
        } else {
            execution_id
        };

        let idx = *index_by_key.entry(unique_key).or_insert_with(|| {
            records.push(ExecutionRecord {
                issue_key: issue_key.clone(),
                cycle_name: cycle_name.clone(),
                folder_name: folder_name.clone(),
                version_name: view.pick(&["version", "fixversion"], "Unscheduled"),
                component_name: view.pick(&["component"], ""),
                status: ExecutionStatus::from_raw(&view.pick(
                    &["executionstatus", "status"],
                    "UNEXECUTED",
                )),
                executed_on: view.pick(&["executed on", "executedon"], ""),
                executed_by: view.pick(&["executed by", "executedby"], ""),
                assigned_to: view.pick(&["assigned to", "assignedto"], ""),
                comment: view.pick(&["comments", "comment"], ""),
                steps: Vec::new(),
            });
            records.len() - 1
        });

        let step_text = view.pick(&["step", "teststep", "test step"], "");
        if !step_text.is_empty() {
            let expected = view.pick(&["expected result", "test result", "result"], "");
            records[idx].steps.push(StepRecord {
                step: step_text,
                data: view.pick(&["test data", "data"], ""),
                result: if expected.is_empty() {
                    String::new()
                } else {
                    format!("Expected: {expected}")
                },
            });
        }
    }

    tracing::debug!(records = records.len(), "loaded executions from CSV");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn allow(keys: &[&str]) -> HashSet<String> {
        keys.iter().map(|k| (*k).to_string()).collect()
    }

    const CSV_BASIC: &str = "\
Issue Key,ExecutionId,CycleName,FolderName,Version,ExecutionStatus,Step,Test Data,Expected Result
GCTEST-94808,E-1,Sprint1,,Unscheduled,PASS,Open login page,user1,Form renders
GCTEST-94808,E-1,Sprint1,,Unscheduled,PASS,Submit credentials,,Dashboard loads
GCTEST-99999,E-2,Sprint1,,Unscheduled,FAIL,,,
";

    #[test]
    fn rows_outside_the_allow_list_are_dropped() {
        let records =
            load_executions(CSV_BASIC.as_bytes(), &allow(&["GCTEST-94808"])).expect("load");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].issue_key, "GCTEST-94808");
    }

    #[test]
    fn rows_with_the_same_execution_id_merge_steps_in_order() {
        let records = load_executions(
            CSV_BASIC.as_bytes(),
            &allow(&["GCTEST-94808", "GCTEST-99999"]),
        )
        .expect("load");
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.status, ExecutionStatus::Pass);
        assert_eq!(first.steps.len(), 2);
        assert_eq!(first.steps[0].step, "Open login page");
        assert_eq!(first.steps[0].data, "user1");
        assert_eq!(first.steps[0].result, "Expected: Form renders");
        assert_eq!(first.steps[1].step, "Submit credentials");
        assert_eq!(first.steps[1].result, "Expected: Dashboard loads");

        // Step-less rows group but carry no steps.
        assert!(records[1].steps.is_empty());
    }

    #[test]
    fn missing_execution_id_falls_back_to_composite_key() {
        let csv = "\
Issue Key,CycleName,FolderName,Step
GCTEST-94722,Sprint2,Smoke,Step one
GCTEST-94722,Sprint2,Smoke,Step two
GCTEST-94722,Sprint2,Regression,Other folder step
";
        let records = load_executions(csv.as_bytes(), &allow(&["GCTEST-94722"])).expect("load");
        // Same issue+cycle+folder merges; the different folder is its own record.
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].steps.len(), 2);
        assert_eq!(records[1].folder_name, "Regression");
        assert_eq!(records[1].steps.len(), 1);
    }

    #[test]
    fn defaults_apply_when_columns_are_absent() {
        let csv = "Issue Key\nGCTEST-95392\n";
        let records = load_executions(csv.as_bytes(), &allow(&["GCTEST-95392"])).expect("load");
        let record = &records[0];
        assert_eq!(record.cycle_name, "Ad hoc");
        assert_eq!(record.version_name, "Unscheduled");
        assert_eq!(record.status, ExecutionStatus::Unexecuted);
        assert_eq!(record.folder_name, "");
    }

    #[test]
    fn bom_prefixed_header_still_matches() {
        let csv = "\u{feff}Issue Key,Status\nGCTEST-95397,WIP\n";
        let records = load_executions(csv.as_bytes(), &allow(&["GCTEST-95397"])).expect("load");
        assert_eq!(records[0].issue_key, "GCTEST-95397");
        assert_eq!(records[0].status, ExecutionStatus::Wip);
    }

    #[test]
    fn field_values_come_from_the_first_row_seen() {
        let csv = "\
Issue Key,ExecutionId,ExecutionStatus,Comments
GCTEST-96437,E-9,BLOCKED,first comment
GCTEST-96437,E-9,PASS,second comment
";
        let records = load_executions(csv.as_bytes(), &allow(&["GCTEST-96437"])).expect("load");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, ExecutionStatus::Blocked);
        assert_eq!(records[0].comment, "first comment");
    }

    #[test]
    fn file_order_is_preserved_across_groups() {
        let csv = "\
Issue Key,ExecutionId
GCTEST-95937,E-b
GCTEST-94808,E-a
";
        let records = load_executions(
            csv.as_bytes(),
            &allow(&["GCTEST-94808", "GCTEST-95937"]),
        )
        .expect("load");
        assert_eq!(records[0].issue_key, "GCTEST-95937");
        assert_eq!(records[1].issue_key, "GCTEST-94808");
    }
}
