//! # zep-client
//!
//! HTTP clients and reference resolvers for Zephyrus:
//! - [`JiraClient`] — Jira REST v2/v3 with basic auth (projects, versions,
//!   components, issues, user directory).
//! - [`ZephyrClient`] — Zephyr Squad public API with a per-request signed
//!   token committing to method, path, and query.
//! - [`resolve`] — get-or-create resolvers over [`RefCaches`], the
//!   run-scoped memo set owned by the workflow driver.
//! - [`users`] — display-name → account-id resolution.
//!
//! Transport policy is shared: 25 s timeout, three attempts with linear
//! backoff on connect/timeout failures only, non-2xx mapped to
//! [`ClientError::Api`] without retry.

mod error;
mod extract;
mod transport;

pub mod resolve;
pub mod users;

mod jira;
mod zephyr;

pub use error::ClientError;
pub use jira::{JiraClient, JiraUser};
pub use resolve::RefCaches;
pub use zephyr::{FolderInfo, ZephyrClient};
