//! Jira REST client (basic auth).

use std::collections::HashMap;

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::error::ClientError;
use crate::transport::{build_http_client, send_with_retry};

/// One entry from the Jira user directory.
#[derive(Debug, Clone, Deserialize)]
pub struct JiraUser {
    #[serde(rename = "accountId")]
    pub account_id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(default)]
    pub active: bool,
}

/// Responses where only the entity id matters (project, issue, creations).
#[derive(Deserialize)]
struct IdDto {
    id: String,
}

#[derive(Deserialize)]
struct NamedIdDto {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

/// Page size for the paginated user directory search.
const USER_PAGE_SIZE: usize = 100;

/// HTTP client for the Jira REST API, authenticated with email + API token.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    api_token: String,
}

impl JiraClient {
    /// Create a client for `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: &str, email: &str, api_token: &str) -> Self {
        Self {
            http: build_http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
            api_token: api_token.to_string(),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .basic_auth(&self.email, Some(&self.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Resolve a project key to its numeric id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure or when the project
    /// id is not numeric. This is the one lookup the binary treats as fatal.
    pub async fn get_project_id(&self, project_key: &str) -> Result<i64, ClientError> {
        let path = format!("/rest/api/2/project/{}", urlencoding::encode(project_key));
        let resp = send_with_retry(self.request(Method::GET, &path)).await?;
        let project: IdDto = resp.json().await?;
        project
            .id
            .parse()
            .map_err(|_| ClientError::Malformed(format!("project id is not numeric: {}", project.id)))
    }

    /// Fetch all fix versions for a project as a name → id map.
    ///
    /// The `"Unscheduled" → -1` sentinel is always present.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure.
    pub async fn list_versions(&self, project_key: &str) -> Result<HashMap<String, i64>, ClientError> {
        let path = format!(
            "/rest/api/2/project/{}/versions",
            urlencoding::encode(project_key)
        );
        let resp = send_with_retry(self.request(Method::GET, &path)).await?;
        let versions: Vec<NamedIdDto> = resp.json().await?;

        let mut mapping = HashMap::new();
        for v in versions {
            if let (Some(name), Some(id)) = (v.name, v.id) {
                if let Ok(id) = id.parse() {
                    mapping.insert(name, id);
                }
            }
        }
        mapping.insert("Unscheduled".to_string(), -1);
        Ok(mapping)
    }

    /// Fetch all components for a project as a name → id map.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure.
    pub async fn list_components(
        &self,
        project_key: &str,
    ) -> Result<HashMap<String, String>, ClientError> {
        let path = format!(
            "/rest/api/2/project/{}/components",
            urlencoding::encode(project_key)
        );
        let resp = send_with_retry(self.request(Method::GET, &path)).await?;
        let components: Vec<NamedIdDto> = resp.json().await?;

        Ok(components
            .into_iter()
            .filter_map(|c| Some((c.name?, c.id?)))
            .collect())
    }

    /// Resolve an issue key to its internal id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure (404 included).
    pub async fn get_issue_id(&self, issue_key: &str) -> Result<String, ClientError> {
        let path = format!("/rest/api/2/issue/{}", urlencoding::encode(issue_key));
        let req = self
            .request(Method::GET, &path)
            .query(&[("fields", "id")]);
        let resp = send_with_retry(req).await?;
        let issue: IdDto = resp.json().await?;
        Ok(issue.id)
    }

    /// Set the single component on an issue.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure.
    pub async fn update_issue_components(
        &self,
        issue_key: &str,
        component_id: &str,
    ) -> Result<(), ClientError> {
        let path = format!("/rest/api/2/issue/{}", urlencoding::encode(issue_key));
        let body = json!({"fields": {"components": [{"id": component_id}]}});
        send_with_retry(self.request(Method::PUT, &path).json(&body)).await?;
        Ok(())
    }

    /// Create a fix version and return its numeric id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure or a non-numeric id.
    pub async fn create_version(&self, project_id: i64, name: &str) -> Result<i64, ClientError> {
        let body = json!({
            "name": name,
            "projectId": project_id,
            "description": "Created by migration",
            "released": false,
        });
        let resp = send_with_retry(self.request(Method::POST, "/rest/api/2/version").json(&body))
            .await?;
        let version: IdDto = resp.json().await?;
        version
            .id
            .parse()
            .map_err(|_| ClientError::Malformed(format!("version id is not numeric: {}", version.id)))
    }

    /// Create a component and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport/API failure.
    pub async fn create_component(
        &self,
        project_key: &str,
        name: &str,
    ) -> Result<String, ClientError> {
        let body = json!({
            "name": name,
            "project": project_key,
            "description": "Created by migration",
        });
        let resp = send_with_retry(self.request(Method::POST, "/rest/api/2/component").json(&body))
            .await?;
        let component: IdDto = resp.json().await?;
        Ok(component.id)
    }

    /// Fetch the full user directory, paging until a short page.
    ///
    /// A failed page ends pagination with whatever was accumulated — a
    /// partial directory degrades user resolution, not the run.
    pub async fn search_users(&self) -> Vec<JiraUser> {
        let mut all_users = Vec::new();
        let mut start_at = 0usize;

        loop {
            let req = self.request(Method::GET, "/rest/api/3/users/search").query(&[
                ("startAt", start_at.to_string()),
                ("maxResults", USER_PAGE_SIZE.to_string()),
            ]);
            let users: Vec<JiraUser> = match send_with_retry(req).await {
                Ok(resp) => match resp.json().await {
                    Ok(users) => users,
                    Err(error) => {
                        tracing::warn!(%error, start_at, "user directory page failed to parse");
                        break;
                    }
                },
                Err(error) => {
                    tracing::warn!(%error, start_at, "user directory page failed");
                    break;
                }
            };

            if users.is_empty() {
                break;
            }
            let page_len = users.len();
            all_users.extend(users);
            if page_len < USER_PAGE_SIZE {
                break;
            }
            start_at += USER_PAGE_SIZE;
        }

        all_users
    }
}
