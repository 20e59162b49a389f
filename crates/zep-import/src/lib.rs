//! # zep-import
//!
//! CSV boundary for Zephyrus: loads the Zephyr export into grouped
//! [`zep_core::ExecutionRecord`]s (header aliasing, allow-list filtering,
//! per-execution grouping with step accumulation) and writes the
//! end-of-run failure report.

mod columns;
mod error;
mod load;
mod report;

pub use error::ImportError;
pub use load::{load_executions, load_executions_file};
pub use report::write_failure_report;
