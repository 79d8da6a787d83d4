//! Configuration error types

use ledgerx_core::errors::{ExError, ExErrorKind};
use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Unsupported database driver: {0}")]
    UnsupportedDriver(String),

    #[error("Invalid connection URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl From<ConfigError> for ExError {
    fn from(err: ConfigError) -> Self {
        let kind = match &err {
            ConfigError::ValidationFailed(ValidationError::UnsupportedDriver(_)) => {
                ExErrorKind::UnsupportedDriver
            }
            _ => ExErrorKind::Configuration,
        };
        ExError::new(kind)
            .with_op("load_settings")
            .with_message(err.to_string())
    }
}

impl From<ValidationError> for ExError {
    fn from(err: ValidationError) -> Self {
        ConfigError::from(err).into()
    }
}
