//! Key-value storage boundary.
//!
//! Mirrors the platform preference store the alarm data originally lived
//! in: string values under well-known keys, whole-value read/write. Alarm
//! counts are small (tens, not thousands), so there is no incremental or
//! log-structured persistence here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StorageError;

/// Whole-value keyed storage. Implementations must be safe to share
/// across the store and the escalation engine.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` if it was never written.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// File-backed store: one JSON file per key under a base directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// File store rooted at the default data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be resolved or created.
    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self::new(super::data_dir()?))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::write(self.path_for(key), value).map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            source: e,
        })
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.read("missing").unwrap(), None);
        store.write("k", "v").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("v"));
        store.write("k", "v2").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert_eq!(store.read("saved_alarms").unwrap(), None);
        store.write("saved_alarms", "[]").unwrap();
        assert_eq!(store.read("saved_alarms").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("saved_alarms.json").exists());
    }

    #[test]
    fn file_store_reports_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("does-not-exist"));
        let err = store.write("k", "v").unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed { .. }));
    }
}
