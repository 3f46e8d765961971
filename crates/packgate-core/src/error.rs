//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("pack artifact not found: {path}")]
    PackNotFound { path: String },

    #[error("invalid pack: {message}")]
    InvalidPack { message: String },

    #[error("failed to parse pack metadata: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid pack version: {0}")]
    InvalidVersion(#[from] semver::Error),

    #[error("invalid request: {field}: {message}")]
    Validation { field: String, message: String },
}

impl CoreError {
    /// Build a validation error for a named request field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
