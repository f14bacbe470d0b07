//! Rotation State Storage
//!
//! Durable storage for the 0/1 rotation index.

use crate::error::{RelayError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the rotation state file
pub const DEFAULT_STATE_FILE: &str = "key_index.json";

/// Number of credentials in every pair
pub const SLOTS: usize = 2;

/// On-disk record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RotationRecord {
    pub index: i64,
}

/// Persistence backend for the rotation index
pub trait RotationStore: Send + Sync {
    /// Read the stored index, already reduced modulo 2
    fn read(&self) -> Result<usize>;

    /// Persist a new index
    fn write(&self, index: usize) -> Result<()>;
}

/// File-backed store holding `{"index": 0|1}`
#[derive(Debug, Clone)]
pub struct FileRotationStore {
    path: PathBuf,
}

impl FileRotationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileRotationStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_FILE)
    }
}

impl RotationStore for FileRotationStore {
    fn read(&self) -> Result<usize> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            RelayError::CredentialStore(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        let record: RotationRecord = serde_json::from_str(&content).map_err(|e| {
            RelayError::CredentialStore(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;

        Ok(record.index.rem_euclid(SLOTS as i64) as usize)
    }

    fn write(&self, index: usize) -> Result<()> {
        let record = RotationRecord {
            index: (index % SLOTS) as i64,
        };
        let content = serde_json::to_string(&record)?;

        std::fs::write(&self.path, content).map_err(|e| {
            RelayError::CredentialStore(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

/// In-memory store, mostly for tests
#[derive(Debug, Default)]
pub struct MemoryRotationStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    index: Option<usize>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryRotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an index already stored
    pub fn with_index(index: usize) -> Self {
        let store = Self::default();
        store.state.lock().index = Some(index);
        store
    }

    /// Make every subsequent read fail
    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    /// Make every subsequent write fail
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// The raw stored value, bypassing failure injection
    pub fn stored(&self) -> Option<usize> {
        self.state.lock().index
    }
}

impl RotationStore for MemoryRotationStore {
    fn read(&self) -> Result<usize> {
        let state = self.state.lock();
        if state.fail_reads {
            return Err(RelayError::CredentialStore(
                "injected read failure".to_string(),
            ));
        }
        state
            .index
            .map(|i| i % SLOTS)
            .ok_or_else(|| RelayError::CredentialStore("no index stored".to_string()))
    }

    fn write(&self, index: usize) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(RelayError::CredentialStore(
                "injected write failure".to_string(),
            ));
        }
        state.index = Some(index % SLOTS);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRotationStore::new(dir.path().join("key_index.json"));

        store.write(1).unwrap();
        assert_eq!(store.read().unwrap(), 1);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"{"index":1}"#);
    }

    #[test]
    fn test_file_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRotationStore::new(dir.path().join("absent.json"));
        assert!(matches!(
            store.read(),
            Err(RelayError::CredentialStore(_))
        ));
    }

    #[test]
    fn test_file_store_reduces_modulo_two() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"index": 7}}"#).unwrap();

        let store = FileRotationStore::new(file.path());
        assert_eq!(store.read().unwrap(), 1);
    }

    #[test]
    fn test_file_store_negative_index() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"index": -1}}"#).unwrap();

        let store = FileRotationStore::new(file.path());
        assert_eq!(store.read().unwrap(), 1);
    }

    #[test]
    fn test_file_store_corrupt() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let store = FileRotationStore::new(file.path());
        assert!(store.read().is_err());
    }

    #[test]
    fn test_memory_store_failure_injection() {
        let store = MemoryRotationStore::with_index(1);
        assert_eq!(store.read().unwrap(), 1);

        store.fail_reads(true);
        assert!(store.read().is_err());

        store.fail_writes(true);
        assert!(store.write(0).is_err());
        assert_eq!(store.stored(), Some(1));
    }
}
