//! Zephyr Squad (ZAPI) client with per-request signed tokens.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::{Digest as _, Sha256};

use crate::error::ClientError;
use crate::extract::extract_id;
use crate::transport::{build_http_client, send_with_retry};

/// Signed token lifetime in seconds.
const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Serialize)]
struct TokenClaims<'a> {
    sub: &'a str,
    qsh: String,
    iss: &'a str,
    iat: i64,
    exp: i64,
}

/// One folder from a cycle's folder listing.
///
/// Listing entries carry `id`; creation responses sometimes use `folderId`.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderInfo {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, rename = "folderId")]
    folder_id: Option<Value>,
    #[serde(default)]
    name: String,
}

impl FolderInfo {
    /// The folder id, whichever field carried it.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.id
            .as_ref()
            .or(self.folder_id.as_ref())
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    /// Case-insensitive, whitespace-trimmed name match.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

/// Build the canonical request string the token's `qsh` claim hashes:
/// `"{METHOD}&{path}&{sorted k=v pairs joined by &}"`.
fn canonical_qsh(method: &Method, path: &str, params: &[(&str, String)]) -> String {
    let mut pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    format!("{}&{path}&{}", method.as_str().to_uppercase(), pairs.join("&"))
}

/// HTTP client for the Zephyr Squad public API.
///
/// Every request carries a fresh HS256 token whose `qsh` claim commits to
/// the method, path, and query of that request.
pub struct ZephyrClient {
    http: reqwest::Client,
    base_url: String,
    access_key: String,
    secret_key: String,
    account_id: String,
}

impl ZephyrClient {
    /// Create a client for `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: &str, access_key: &str, secret_key: &str, account_id: &str) -> Self {
        Self {
            http: build_http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            account_id: account_id.to_string(),
        }
    }

    fn sign(&self, canonical: &str) -> Result<String, ClientError> {
        let now = chrono::Utc::now().timestamp();
        let claims = TokenClaims {
            sub: &self.account_id,
            qsh: format!("{:x}", Sha256::digest(canonical.as_bytes())),
            iss: &self.access_key,
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };
        Ok(jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(self.secret_key.as_bytes()),
        )?)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let token = self.sign(&canonical_qsh(&method, path, params))?;
        let mut req = self
            .http
            .request(method, format!("{}{path}", self.base_url))
            .header(reqwest::header::AUTHORIZATION, format!("JWT {token}"))
            .header("zapiAccessKey", &self.access_key);
        if !params.is_empty() {
            req = req.query(params);
        }
        Ok(req)
    }

    /// List the test steps currently attached to an issue.
    ///
    /// The endpoint returns either an object keyed by step id or a bare
    /// array; both shapes flatten to a list.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure.
    pub async fn list_test_steps(
        &self,
        project_id: i64,
        issue_id: &str,
    ) -> Result<Vec<Value>, ClientError> {
        let path = format!("/public/rest/api/1.0/teststep/{issue_id}");
        let params = [("projectId", project_id.to_string())];
        let resp = send_with_retry(self.request(Method::GET, &path, &params)?).await?;
        let value: Value = resp.json().await?;
        Ok(steps_from(value))
    }

    /// Create one test step at `order_id` (1-based).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure.
    pub async fn create_test_step(
        &self,
        project_id: i64,
        issue_id: &str,
        order_id: usize,
        step: &str,
        data: &str,
        result: &str,
    ) -> Result<(), ClientError> {
        let path = format!("/public/rest/api/1.0/teststep/{issue_id}");
        let params = [("projectId", project_id.to_string())];
        let body = json!({
            "step": step,
            "data": data,
            "result": result,
            "orderId": order_id,
        });
        send_with_retry(self.request(Method::POST, &path, &params)?.json(&body)).await?;
        Ok(())
    }

    /// Create a cycle and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure or when the response
    /// carries no cycle id.
    pub async fn create_cycle(
        &self,
        project_id: i64,
        version_id: i64,
        name: &str,
    ) -> Result<String, ClientError> {
        let body = json!({
            "name": name,
            "projectId": project_id,
            "versionId": version_id,
            "description": "Created by migration",
        });
        let resp = send_with_retry(
            self.request(Method::POST, "/public/rest/api/1.0/cycle", &[])?
                .json(&body),
        )
        .await?;
        let value: Value = resp.json().await?;
        extract_id(&value, &["id", "cycleId"])?
            .ok_or_else(|| ClientError::Malformed("cycle response carried no id".into()))
    }

    /// List folders in a (project, version, cycle) scope.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure.
    pub async fn list_folders(
        &self,
        project_id: i64,
        version_id: i64,
        cycle_id: &str,
    ) -> Result<Vec<FolderInfo>, ClientError> {
        let params = [
            ("projectId", project_id.to_string()),
            ("versionId", version_id.to_string()),
            ("cycleId", cycle_id.to_string()),
        ];
        let resp =
            send_with_retry(self.request(Method::GET, "/public/rest/api/1.0/folders", &params)?)
                .await?;
        Ok(resp.json().await?)
    }

    /// Create a folder in a cycle and return it for listing-cache insertion.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure.
    pub async fn create_folder(
        &self,
        project_id: i64,
        version_id: i64,
        cycle_id: &str,
        name: &str,
    ) -> Result<FolderInfo, ClientError> {
        let body = json!({
            "name": name,
            "projectId": project_id,
            "versionId": version_id,
            "cycleId": cycle_id,
            "description": name,
        });
        let resp = send_with_retry(
            self.request(Method::POST, "/public/rest/api/1.0/folder", &[])?
                .json(&body),
        )
        .await?;
        Ok(resp.json().await?)
    }

    /// Create an execution shell for an issue and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure, a non-numeric issue
    /// id, or a response carrying no execution id.
    pub async fn create_execution(
        &self,
        project_id: i64,
        version_id: i64,
        cycle_id: &str,
        folder_id: Option<&str>,
        issue_id: &str,
    ) -> Result<String, ClientError> {
        let issue_id = numeric_issue_id(issue_id)?;
        let mut body = json!({
            "issueId": issue_id,
            "projectId": project_id,
            "versionId": version_id,
            "cycleId": cycle_id,
        });
        if let (Some(folder_id), Some(object)) = (folder_id, body.as_object_mut()) {
            object.insert("folderId".into(), json!(folder_id));
        }
        let resp = send_with_retry(
            self.request(Method::POST, "/public/rest/api/1.0/execution", &[])?
                .json(&body),
        )
        .await?;
        let value: Value = resp.json().await?;
        execution_id(&value)?
            .ok_or_else(|| ClientError::Malformed(format!("no execution id in response: {value}")))
    }

    /// Set status and execution metadata on a created execution.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure or a non-numeric
    /// issue id.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_execution(
        &self,
        execution_id: &str,
        issue_id: &str,
        project_id: i64,
        version_id: i64,
        cycle_id: &str,
        status_id: i64,
        executed_on_millis: Option<i64>,
        executed_by: Option<&str>,
        assigned_to: Option<&str>,
    ) -> Result<(), ClientError> {
        let path = format!("/public/rest/api/1.0/execution/{execution_id}");
        let params = [
            ("projectId", project_id.to_string()),
            ("issueId", issue_id.to_string()),
        ];
        let mut body = json!({
            "status": {"id": status_id},
            "projectId": project_id,
            "versionId": version_id,
            "cycleId": cycle_id,
            "issueId": numeric_issue_id(issue_id)?,
        });
        if let Some(object) = body.as_object_mut() {
            if let Some(millis) = executed_on_millis {
                object.insert("executedOn".into(), json!(millis));
            }
            if let Some(executed_by) = executed_by {
                object.insert("executedBy".into(), json!(executed_by));
            }
            if let Some(assigned_to) = assigned_to {
                object.insert("assignedTo".into(), json!(assigned_to));
            }
        }
        send_with_retry(self.request(Method::PUT, &path, &params)?.json(&body)).await?;
        Ok(())
    }

    /// Delete an execution (compensation for a failed update).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure.
    pub async fn delete_execution(
        &self,
        execution_id: &str,
        issue_id: &str,
    ) -> Result<(), ClientError> {
        let path = format!("/public/rest/api/1.0/execution/{execution_id}");
        let params = [("issueId", issue_id.to_string())];
        send_with_retry(self.request(Method::DELETE, &path, &params)?).await?;
        Ok(())
    }

    /// Attach a comment to an execution.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure.
    pub async fn add_comment(&self, execution_id: &str, comment: &str) -> Result<(), ClientError> {
        let path = format!("/public/rest/api/1.0/execution/{execution_id}/comment");
        let body = json!({"comment": comment.trim()});
        send_with_retry(self.request(Method::POST, &path, &[])?.json(&body)).await?;
        Ok(())
    }
}

fn numeric_issue_id(issue_id: &str) -> Result<i64, ClientError> {
    issue_id
        .parse()
        .map_err(|_| ClientError::Malformed(format!("issue id is not numeric: {issue_id}")))
}

/// Execution id from a creation response: nested under `execution`, else
/// top-level `id`.
fn execution_id(value: &Value) -> Result<Option<String>, ClientError> {
    if let Some(nested) = value.get("execution") {
        if let Some(id) = extract_id(nested, &["id"])? {
            return Ok(Some(id));
        }
    }
    extract_id(value, &["id"])
}

/// Flatten the teststep listing's two shapes (object keyed by id, or array).
fn steps_from(value: Value) -> Vec<Value> {
    match value {
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}
