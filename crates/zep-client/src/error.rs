//! Client error types.

use thiserror::Error;

/// Errors that can occur when talking to Jira or Zephyr.
///
/// The workflow treats any of these as an absent result for the current
/// record; none are process-fatal on their own.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error (after retries for connect/timeout failures).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code. Never retried.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// A response parsed as JSON but did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Signing the Zephyr request token failed.
    #[error("token signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}
