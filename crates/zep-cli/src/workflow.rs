//! Migration workflow driver.
//!
//! Processes one record at a time, end to end, before touching the next:
//! issue lookup → component update → step sync → version/cycle/folder
//! resolution → execution create → execution update → comment, with a
//! compensating delete when the update fails after creation. Any absent
//! identifier short-circuits the record to the failure report; the run
//! always continues to the next record.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use anyhow::Context as _;

use zep_client::{JiraClient, JiraUser, RefCaches, ZephyrClient, resolve, users};
use zep_config::MigrationConfig;
use zep_core::normalize::parse_date_to_millis;
use zep_core::{ExecutionRecord, FailureItem};

use crate::cli::Cli;

/// The failed issue keys this run is restricted to.
const FAILED_ISSUE_KEYS: [&str; 6] = [
    "GCTEST-94808",
    "GCTEST-95392",
    "GCTEST-95397",
    "GCTEST-96437",
    "GCTEST-94722",
    "GCTEST-95937",
];

/// Output path for the failure report.
const FAILURE_REPORT_PATH: &str = "retry_failed_executions.csv";

struct Migration<'a> {
    jira: &'a JiraClient,
    zephyr: &'a ZephyrClient,
    project_id: i64,
    project_key: &'a str,
    user_mapping: HashMap<String, String>,
    directory: Vec<JiraUser>,
    caches: RefCaches,
    steps_created: HashSet<String>,
}

/// Run the whole migration. Only config loading and the project lookup are
/// fatal; everything else degrades to per-record failures.
pub async fn migrate(cli: &Cli, config: &MigrationConfig) -> anyhow::Result<()> {
    let jira = JiraClient::new(config.jira_url(), &config.jira_email, &config.jira_api_token);
    let zephyr = ZephyrClient::new(
        config.zephyr_base_url(),
        &config.zephyr_access_key,
        &config.zephyr_secret_key,
        &config.zephyr_account_id,
    );

    let user_mapping = cli
        .user_mapping
        .as_deref()
        .map(zep_config::load_user_mapping)
        .unwrap_or_default();
    if !user_mapping.is_empty() {
        tracing::info!(entries = user_mapping.len(), "loaded user mappings");
    }

    let project_id = jira
        .get_project_id(&cli.target_project_key)
        .await
        .with_context(|| format!("failed to fetch project {}", cli.target_project_key))?;

    let versions = match jira.list_versions(&cli.target_project_key).await {
        Ok(versions) => versions,
        Err(error) => {
            tracing::warn!(%error, "could not list versions, starting from the sentinel only");
            HashMap::from([("Unscheduled".to_string(), resolve::UNSCHEDULED_VERSION_ID)])
        }
    };
    let components = match jira.list_components(&cli.target_project_key).await {
        Ok(components) => components,
        Err(error) => {
            tracing::warn!(%error, "could not list components, starting empty");
            HashMap::new()
        }
    };

    let allow_list: HashSet<String> = FAILED_ISSUE_KEYS.iter().map(|k| (*k).to_string()).collect();
    let records = zep_import::load_executions_file(&cli.csv, &allow_list)
        .with_context(|| format!("failed to load CSV from '{}'", cli.csv.display()))?;

    tracing::info!(
        project = %cli.target_project_key,
        project_id,
        versions = versions.len(),
        components = components.len(),
        executions = records.len(),
        retry_keys = FAILED_ISSUE_KEYS.len(),
        "retry migration starting",
    );

    tracing::info!("fetching Jira user directory");
    let directory = jira.search_users().await;
    tracing::info!(users = directory.len(), "user directory fetched");

    let mut migration = Migration {
        jira: &jira,
        zephyr: &zephyr,
        project_id,
        project_key: &cli.target_project_key,
        user_mapping,
        directory,
        caches: RefCaches::new(versions, components),
        steps_created: HashSet::new(),
    };

    let delay = Duration::from_secs_f64(config.rate_limit_delay.max(0.0));
    let total = records.len();
    let mut created = 0usize;
    let mut failures: Vec<FailureItem> = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        tracing::info!(
            record = idx + 1,
            total,
            issue_key = %record.issue_key,
            status = %record.status,
            cycle = %record.cycle_name,
            folder = %record.folder_name,
            "processing",
        );

        match migration.process_record(record).await {
            Ok(execution_id) => {
                created += 1;
                tracing::info!(%execution_id, "created execution");
            }
            Err(failure) => {
                tracing::warn!(
                    issue_key = %record.issue_key,
                    reason = %failure.failure_reason,
                    "record failed",
                );
                failures.push(failure);
            }
        }

        tokio::time::sleep(delay).await;
    }

    if let Err(error) = zep_import::write_failure_report(&failures, FAILURE_REPORT_PATH) {
        tracing::error!(%error, path = FAILURE_REPORT_PATH, "could not write failure report");
    }

    tracing::info!(total, created, failed = failures.len(), "retry migration complete");
    Ok(())
}

impl Migration<'_> {
    /// Process one record through the full state sequence. Returns the
    /// created execution id, or the failure item to report.
    async fn process_record(&mut self, record: &ExecutionRecord) -> Result<String, FailureItem> {
        let Some(issue_id) =
            resolve::issue_id(self.jira, &mut self.caches, &record.issue_key).await
        else {
            return Err(FailureItem::new(record.clone(), "Issue not found"));
        };

        if !record.component_name.is_empty() {
            self.update_component(record).await;
        }

        if !record.steps.is_empty() && !self.steps_created.contains(&record.issue_key) {
            self.sync_steps(&issue_id, record).await;
            self.steps_created.insert(record.issue_key.clone());
        }

        let version_id =
            resolve::version_id(self.jira, &mut self.caches, self.project_id, &record.version_name)
                .await;

        let Some(cycle_id) = resolve::cycle_id(
            self.zephyr,
            &mut self.caches,
            self.project_id,
            version_id,
            &record.cycle_name,
        )
        .await
        else {
            return Err(FailureItem::new(record.clone(), "Could not create cycle"));
        };

        let folder_id = if record.folder_name.is_empty() {
            None
        } else {
            resolve::folder_id(
                self.zephyr,
                &mut self.caches,
                self.project_id,
                version_id,
                &cycle_id,
                &record.folder_name,
            )
            .await
        };

        let executed_by = self.account_id(&record.executed_by);
        let assigned_to = self.account_id(&record.assigned_to);

        let execution_id = match self
            .zephyr
            .create_execution(self.project_id, version_id, &cycle_id, folder_id.as_deref(), &issue_id)
            .await
        {
            Ok(id) => id,
            Err(error) => {
                tracing::warn!(issue_key = %record.issue_key, %error, "execution creation failed");
                return Err(FailureItem::new(record.clone(), "Could not create execution"));
            }
        };

        let updated = self
            .zephyr
            .update_execution(
                &execution_id,
                &issue_id,
                self.project_id,
                version_id,
                &cycle_id,
                record.status.status_id(),
                parse_date_to_millis(&record.executed_on),
                executed_by.as_deref(),
                assigned_to.as_deref(),
            )
            .await;

        match updated {
            Ok(()) => {
                if !record.comment.trim().is_empty() {
                    if let Err(error) = self.zephyr.add_comment(&execution_id, &record.comment).await
                    {
                        tracing::warn!(%execution_id, %error, "could not add comment");
                    }
                }
                Ok(execution_id)
            }
            Err(error) => {
                // Best-effort compensation: the execution would otherwise be
                // left behind as UNEXECUTED. The delete outcome is logged but
                // not verified.
                tracing::warn!(%execution_id, %error, "failed to set status, deleting execution");
                if let Err(delete_error) =
                    self.zephyr.delete_execution(&execution_id, &issue_id).await
                {
                    tracing::warn!(%execution_id, %delete_error, "compensating delete failed");
                }
                Err(FailureItem::with_execution_id(
                    record.clone(),
                    "Could not execute execution (deleted)",
                    execution_id,
                ))
            }
        }
    }

    async fn update_component(&mut self, record: &ExecutionRecord) {
        let Some(component_id) = resolve::component_id(
            self.jira,
            &mut self.caches,
            self.project_key,
            &record.component_name,
        )
        .await
        else {
            return;
        };

        match self
            .jira
            .update_issue_components(&record.issue_key, &component_id)
            .await
        {
            Ok(()) => {
                tracing::info!(issue_key = %record.issue_key, component = %record.component_name, "set component");
            }
            Err(error) => {
                tracing::warn!(issue_key = %record.issue_key, %error, "could not set component");
            }
        }
    }

    /// Create the record's steps unless the issue already has some.
    async fn sync_steps(&self, issue_id: &str, record: &ExecutionRecord) {
        let existing = match self.zephyr.list_test_steps(self.project_id, issue_id).await {
            Ok(existing) => existing,
            Err(error) => {
                tracing::warn!(issue_key = %record.issue_key, %error, "could not list test steps");
                Vec::new()
            }
        };
        if !existing.is_empty() {
            tracing::info!(
                issue_key = %record.issue_key,
                existing = existing.len(),
                "issue already has test steps, skipping",
            );
            return;
        }

        tracing::info!(issue_key = %record.issue_key, steps = record.steps.len(), "creating test steps");
        for (position, step) in record.steps.iter().enumerate() {
            let order_id = position + 1;
            if let Err(error) = self
                .zephyr
                .create_test_step(self.project_id, issue_id, order_id, &step.step, &step.data, &step.result)
                .await
            {
                tracing::warn!(issue_key = %record.issue_key, order_id, %error, "could not create test step");
            }
        }
    }

    fn account_id(&mut self, raw_name: &str) -> Option<String> {
        if raw_name.is_empty() {
            return None;
        }
        users::resolve_account_id(
            raw_name,
            &mut self.caches.users,
            &self.user_mapping,
            &self.directory,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_is_the_fixed_retry_set() {
        let allow: HashSet<&str> = FAILED_ISSUE_KEYS.into_iter().collect();
        assert_eq!(allow.len(), 6);
        assert!(allow.contains("GCTEST-94808"));
        assert!(!allow.contains("GCTEST-00000"));
    }
}
