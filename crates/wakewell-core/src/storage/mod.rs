//! Persistence layer: well-known keys, key-value storage, configuration.
//!
//! All durable state lives behind the [`KeyValueStore`] boundary as two
//! well-known keys: the full alarm collection as one versioned JSON blob,
//! and the adaptive baseline as a single scalar. Callers never interleave
//! raw reads/writes outside the owning component.

mod config;
pub mod kv;

pub use config::{Config, EscalationConfig, HoldConfig};
pub use kv::{FileStore, KeyValueStore, MemoryStore};

use std::path::PathBuf;

use crate::error::StorageError;

/// Storage key for the serialized alarm collection.
pub const ALARMS_KEY: &str = "saved_alarms";

/// Storage key for the adaptive baseline intensity scalar.
pub const BASELINE_KEY: &str = "adaptive_base_intensity";

/// Returns `~/.config/wakewell[-dev]/` based on WAKEWELL_ENV.
///
/// Set WAKEWELL_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WAKEWELL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("wakewell-dev")
    } else {
        base_dir.join("wakewell")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(e.to_string()))?;
    Ok(dir)
}
