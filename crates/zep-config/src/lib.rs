//! # zep-config
//!
//! Layered configuration loading for Zephyrus using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ZEP_*` prefix, `__` as separator)
//! 2. The JSON config file named on the command line
//! 3. Built-in defaults
//!
//! # Usage
//!
//! ```no_run
//! use zep_config::MigrationConfig;
//!
//! let config = MigrationConfig::load("config.json").expect("config");
//! println!("Jira: {}", config.jira_url());
//! ```

mod error;
mod user_map;

pub use error::ConfigError;
pub use user_map::load_user_mapping;

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default seconds to sleep after each processed record.
const DEFAULT_RATE_LIMIT_DELAY_SECS: f64 = 1.5;

/// Endpoint URLs, credentials, and signing keys for one migration run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MigrationConfig {
    /// Jira base URL (e.g. `https://example.atlassian.net`).
    #[serde(default)]
    pub jira_url: String,

    /// Jira account email for basic auth.
    #[serde(default)]
    pub jira_email: String,

    /// Jira API token paired with the email.
    #[serde(default)]
    pub jira_api_token: String,

    /// Zephyr Squad API base URL.
    #[serde(default)]
    pub zephyr_base_url: String,

    /// ZAPI access key (`iss` claim and `zapiAccessKey` header).
    #[serde(default)]
    pub zephyr_access_key: String,

    /// ZAPI secret key used to sign request tokens.
    #[serde(default)]
    pub zephyr_secret_key: String,

    /// Zephyr account id (`sub` claim).
    #[serde(default)]
    pub zephyr_account_id: String,

    /// Seconds to sleep after each record.
    #[serde(default = "default_rate_limit_delay")]
    pub rate_limit_delay: f64,
}

const fn default_rate_limit_delay() -> f64 {
    DEFAULT_RATE_LIMIT_DELAY_SECS
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            jira_url: String::new(),
            jira_email: String::new(),
            jira_api_token: String::new(),
            zephyr_base_url: String::new(),
            zephyr_access_key: String::new(),
            zephyr_secret_key: String::new(),
            zephyr_account_id: String::new(),
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY_SECS,
        }
    }
}

impl MigrationConfig {
    /// Load configuration from the given JSON file plus `ZEP_*` environment
    /// overrides, then validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or a
    /// required field is missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path.as_ref()).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain. Public so tests can layer
    /// additional providers.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed("ZEP_").split("__"))
    }

    /// Reject configs missing endpoint or credential fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first empty field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("jira_url", &self.jira_url),
            ("jira_email", &self.jira_email),
            ("jira_api_token", &self.jira_api_token),
            ("zephyr_base_url", &self.zephyr_base_url),
            ("zephyr_access_key", &self.zephyr_access_key),
            ("zephyr_secret_key", &self.zephyr_secret_key),
            ("zephyr_account_id", &self.zephyr_account_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must be set")));
            }
        }
        Ok(())
    }

    /// Jira base URL without a trailing slash.
    #[must_use]
    pub fn jira_url(&self) -> &str {
        self.jira_url.trim_end_matches('/')
    }

    /// Zephyr base URL without a trailing slash.
    #[must_use]
    pub fn zephyr_base_url(&self) -> &str {
        self.zephyr_base_url.trim_end_matches('/')
    }
}
