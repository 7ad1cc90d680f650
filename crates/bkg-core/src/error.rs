//! Centralized error types for BKG core.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for dataset and configuration operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to open dataset {path}: {source}")]
    DatasetOpen {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to parse row in {path}: {source}")]
    DatasetRow {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid boundary file {path}: {reason}")]
    Boundaries { path: PathBuf, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
