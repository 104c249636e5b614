//! Core error types for wakewell-core.
//!
//! Storage and configuration return typed errors; the alarm store and the
//! escalation engine deliberately swallow them at the boundary (a failed
//! persistence write must never surface as a user-facing alarm failure).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wakewell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Key-value storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to resolve or create the data directory
    #[error("Failed to resolve data directory: {0}")]
    DataDir(String),

    /// Failed to read a key's backing file
    #[error("Failed to read '{key}': {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a key's backing file
    #[error("Failed to write '{key}': {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored value could not be decoded
    #[error("Failed to decode '{key}': {message}")]
    DecodeFailed { key: String, message: String },
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
