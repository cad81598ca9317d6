//! In-memory [`SelectionStore`] for tests and embedding.
//!
//! Holds the serialized JSON snapshot behind a `RwLock`, so a save followed
//! by a load exercises the same encoding as a file-backed store. Writes can
//! be made to fail on demand to simulate an unavailable backend.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::StorageError;
use crate::models::Record;

use super::SelectionStore;

/// In-memory store keeping the last saved snapshot as JSON.
#[derive(Default)]
pub struct InMemorySelectionStore {
    snapshot: RwLock<Option<String>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl InMemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `records`.
    pub fn with_records(records: &[Record]) -> Result<Self, StorageError> {
        let store = Self::new();
        store.save(records)?;
        store.saves.store(0, Ordering::SeqCst);
        Ok(store)
    }

    /// A store whose slot holds arbitrary raw text.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let store = Self::new();
        *store.snapshot.write().unwrap() = Some(raw.into());
        store
    }

    /// Make subsequent saves fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Raw JSON of the last saved snapshot.
    pub fn raw(&self) -> Option<String> {
        self.snapshot.read().unwrap().clone()
    }
}

impl SelectionStore for InMemorySelectionStore {
    fn load(&self) -> Result<Option<Vec<Record>>, StorageError> {
        match self.snapshot.read().unwrap().as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, selection: &[Record]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "in-memory store is read-only",
            )));
        }
        let encoded = serde_json::to_string(selection)?;
        *self.snapshot.write().unwrap() = Some(encoded);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
