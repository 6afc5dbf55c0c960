//! Custom error types for logbackup
//!
//! This module defines the error hierarchy for the tool using thiserror
//! for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for logbackup operations
#[derive(Error, Debug)]
pub enum BackupError {
    /// Configuration-related errors (invalid policy, unreadable config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// A file matched the backup pattern but its name could not be parsed
    #[error("Invalid backup name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Archive creation failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// Another invocation holds the lock on the backup directory
    #[error("Backup directory is locked by another run: {}", .0.display())]
    Locked(PathBuf),
}

impl BackupError {
    /// Create an "invalid name" error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a lock contention error
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked(_))
    }
}

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for BackupError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

/// Result type alias for logbackup operations
pub type BackupResult<T> = Result<T, BackupError>;
