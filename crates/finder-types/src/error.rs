//! Error types for the athlete-finder system.

use thiserror::Error;

/// Error raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum FinderError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for FinderError {
    fn from(e: config::ConfigError) -> Self {
        FinderError::Config(e.to_string())
    }
}
