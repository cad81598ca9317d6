//! Persistence abstraction for the selection set.
//!
//! The [`SelectionStore`] trait reads and writes the full selection as an
//! ordered list of records under one fixed storage slot. Every write is a
//! full overwrite; there is no incremental update.
//!
//! Operations are synchronous: the engine persists inside the same step as
//! the mutation that caused the write, so a caller that has seen a toggle
//! complete can read its effect back from the store.

pub mod memory;

use crate::error::StorageError;
use crate::models::Record;

/// Storage slot used by the dashboard for the selection.
pub const DEFAULT_SLOT: &str = "selectedData";

/// Backend holding the persisted selection.
///
/// Implementations must be `Send + Sync` so an engine can be moved into an
/// async task.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`load`](SelectionStore::load) | Read the stored selection, `None` when nothing was ever saved |
/// | [`save`](SelectionStore::save) | Overwrite the stored selection |
pub trait SelectionStore: Send + Sync {
    /// Read the stored selection.
    ///
    /// Returns `None` when the slot was never written. A slot holding an
    /// empty list is `Some(vec![])`: the user cleared the selection.
    fn load(&self) -> Result<Option<Vec<Record>>, StorageError>;

    /// Replace the stored selection with `selection`.
    fn save(&self, selection: &[Record]) -> Result<(), StorageError>;
}
