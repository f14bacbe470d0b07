//! Persistent Key Rotator
//!
//! A two-way toggle that remembers which credential slot to use next,
//! across process restarts.
//!
//! Reads and the advance-write are not mutually exclusive: two requests
//! advancing at the same time can repeat or skip a slot. The index picks a
//! credential, nothing more, so that is tolerated.

use crate::rotation::store::{RotationStore, SLOTS};
use std::sync::Arc;
use tracing::{debug, warn};

/// Selects the current credential slot and flips it on demand
#[derive(Clone)]
pub struct KeyRotator {
    store: Arc<dyn RotationStore>,
}

impl KeyRotator {
    pub fn new(store: Arc<dyn RotationStore>) -> Self {
        Self { store }
    }

    /// Current slot. Missing or corrupt state reads as 0.
    pub fn current_index(&self) -> usize {
        match self.store.read() {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "rotation state unavailable, using slot 0");
                0
            }
        }
    }

    /// Flip to the other slot and return the one that was in effect before.
    ///
    /// A failed write is logged and otherwise ignored; the caller keeps
    /// using the returned slot either way.
    pub fn advance(&self) -> usize {
        let current = self.current_index();
        let next = (current + 1) % SLOTS;

        if let Err(e) = self.store.write(next) {
            warn!(error = %e, current, next, "failed to persist rotation index");
        } else {
            debug!(from = current, to = next, "rotated credential slot");
        }

        current
    }
}

impl std::fmt::Debug for KeyRotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRotator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::store::{FileRotationStore, MemoryRotationStore};
    use std::io::Write;

    #[test]
    fn test_advance_two_cycle() {
        let rotator = KeyRotator::new(Arc::new(MemoryRotationStore::new()));

        assert_eq!(rotator.advance(), 0);
        assert_eq!(rotator.advance(), 1);
        assert_eq!(rotator.advance(), 0);
        assert_eq!(rotator.current_index(), 1);
    }

    #[test]
    fn test_persists_across_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key_index.json");

        let first = KeyRotator::new(Arc::new(FileRotationStore::new(&path)));
        assert_eq!(first.advance(), 0);
        drop(first);

        let restarted = KeyRotator::new(Arc::new(FileRotationStore::new(&path)));
        assert_eq!(restarted.current_index(), 1);
    }

    #[test]
    fn test_missing_state_reads_zero() {
        let dir = tempfile::tempdir().unwrap();
        let rotator = KeyRotator::new(Arc::new(FileRotationStore::new(
            dir.path().join("nothing-here.json"),
        )));
        assert_eq!(rotator.current_index(), 0);
    }

    #[test]
    fn test_corrupt_state_reads_zero() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"index\": \"one\"").unwrap();

        let rotator = KeyRotator::new(Arc::new(FileRotationStore::new(file.path())));
        assert_eq!(rotator.current_index(), 0);
        assert_eq!(rotator.advance(), 0);
        assert_eq!(rotator.current_index(), 1);
    }

    #[test]
    fn test_write_failure_keeps_decision() {
        let store = Arc::new(MemoryRotationStore::with_index(1));
        store.fail_writes(true);

        let rotator = KeyRotator::new(store.clone());
        assert_eq!(rotator.advance(), 1);
        assert_eq!(rotator.advance(), 1);
        assert_eq!(store.stored(), Some(1));
    }
}
