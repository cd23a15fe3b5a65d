//! Error types for descriptor loading and configuration
//!
//! Compilation itself never fails; these errors only cover the edges where
//! the crate touches files, JSON text or configuration sources.

use thiserror::Error;

/// Result type for fallible fixture-schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while loading descriptors, documents or configuration
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid schema descriptor at {path}: {message}")]
    InvalidDescriptor { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl From<serde_path_to_error::Error<serde_json::Error>> for SchemaError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        SchemaError::InvalidDescriptor {
            path,
            message: err.into_inner().to_string(),
        }
    }
}
