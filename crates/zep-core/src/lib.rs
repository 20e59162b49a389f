//! # zep-core
//!
//! Shared domain types for Zephyrus, the Zephyr Squad execution
//! retry-migration tool:
//! - [`ExecutionRecord`] / [`StepRecord`] — one test execution grouped from
//!   CSV rows, with its ordered test steps.
//! - [`ExecutionStatus`] — the fixed Zephyr status table with an explicit
//!   unknown fallback.
//! - [`FailureItem`] — a failed record plus its reason, for the end-of-run
//!   report.
//! - [`normalize`] — whitespace/user-name cleanup and date parsing shared by
//!   the import and client crates.

pub mod normalize;

mod record;
mod status;

pub use record::{ExecutionRecord, FailureItem, StepRecord};
pub use status::ExecutionStatus;
