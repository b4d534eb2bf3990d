pub mod json_backend;

use std::sync::{Arc, Mutex};

use crate::{errors::LedgerError, ledger::Snapshot};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Persistence port consumed by [`crate::ledger::Ledger`].
///
/// `load` never fails: missing or unreadable data yields the empty snapshot.
/// `save` always receives the complete snapshot.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Snapshot;
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

pub use json_backend::JsonFileStore;

/// Process-local store. Clones share the same slot, which lets a test keep a
/// handle after moving the store into a ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    snapshot: Option<Snapshot>,
    fail_saves: bool,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::default();
        store.with_state(|state| state.snapshot = Some(snapshot));
        store
    }

    /// Makes subsequent saves fail with a persistence error until reset.
    pub fn set_fail_saves(&self, fail: bool) {
        self.with_state(|state| state.fail_saves = fail);
    }

    /// Last successfully saved snapshot, if any.
    pub fn stored(&self) -> Option<Snapshot> {
        self.with_state(|state| state.snapshot.clone())
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.with_state(|state| state.saves)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MemoryState) -> R) -> R {
        match self.inner.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Snapshot {
        self.stored().unwrap_or_default()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.with_state(|state| {
            if state.fail_saves {
                return Err(LedgerError::Persistence(
                    "memory store rejected the write".into(),
                ));
            }
            state.snapshot = Some(snapshot.clone());
            state.saves += 1;
            Ok(())
        })
    }
}
