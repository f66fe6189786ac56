//! Error types for moseq-bridge

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during conversion
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Project directory not found: {0}")]
    ProjectNotFound(PathBuf),

    #[error("Model folder not found in project: {0}")]
    ModelNotFound(String),

    #[error("Results artifact not found: {0}")]
    ResultsNotFound(PathBuf),

    #[error("Session not found in results: {0}")]
    SessionNotFound(String),

    #[error("Invalid project config: {0}")]
    InvalidConfig(String),

    #[error("Invalid results for session {session}: {reason}")]
    InvalidResults { session: String, reason: String },

    #[error("Invalid timestamps: {0}")]
    InvalidTimestamps(String),

    #[error("Output file already exists: {0}")]
    OutputExists(PathBuf),
}
