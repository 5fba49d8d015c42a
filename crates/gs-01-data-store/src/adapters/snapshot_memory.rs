//! In-memory snapshot store for tests and ephemeral nodes.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::domain::{PersistenceError, StoreSnapshot};
use crate::ports::SnapshotStore;

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshot: Mutex<Option<StoreSnapshot>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded with a snapshot, as if written by a previous run.
    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    /// Make subsequent saves fail with an I/O error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn latest(&self) -> Option<StoreSnapshot> {
        self.snapshot.lock().clone()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load_snapshot(&self) -> Result<Option<StoreSnapshot>, PersistenceError> {
        Ok(self.snapshot.lock().clone())
    }

    fn save_snapshot(&self, snapshot: &StoreSnapshot) -> Result<(), PersistenceError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated write failure",
            )));
        }
        *self.snapshot.lock() = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
