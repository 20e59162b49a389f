//! Import error types.

use thiserror::Error;

/// Errors raised while reading the export CSV or writing the failure report.
#[derive(Debug, Error)]
pub enum ImportError {
    /// File could not be opened or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row or header could not be parsed as CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
