//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating migration configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or parsed.
    #[error("config error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A required field is missing or empty.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        Self::Figment(Box::new(error))
    }
}
