//! Engine notifications.
//!
//! The engine reports every externally visible transition as a
//! [`SyncEvent`] to a [`SyncObserver`]. A rendering layer subscribes by
//! implementing the trait and redrawing when it sees `PageLoaded` or
//! `SelectionChanged`; the CLI uses it for human or JSON diagnostics.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::models::Record;

/// A single engine notification.
///
/// Serializes as a flat object tagged by `event`, e.g.
/// `{"event":"selection_changed","id":4,"selected":false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    /// The selection was restored from storage at startup.
    SelectionRestored { count: usize },
    /// A page request was issued.
    FetchStarted {
        request: u64,
        page: u32,
        page_size: u32,
        search_term: String,
    },
    /// A page response was applied.
    PageLoaded {
        request: u64,
        page: u32,
        total_pages: u32,
        items: Vec<Record>,
    },
    /// A page request failed; the previous page is still shown.
    FetchFailed { request: u64, error: String },
    /// A response arrived after a newer request had been issued.
    StaleDiscarded { request: u64 },
    /// The initial selection was seeded from the first page.
    Seeded { count: usize },
    /// A record entered or left the selection.
    SelectionChanged { id: i64, selected: bool },
    /// Writing the selection snapshot failed.
    PersistFailed { error: String },
}

/// Receives engine notifications. Called synchronously from the engine.
pub trait SyncObserver: Send + Sync {
    fn notify(&self, event: &SyncEvent);
}

impl<T: SyncObserver + ?Sized> SyncObserver for Arc<T> {
    fn notify(&self, event: &SyncEvent) {
        (**self).notify(event)
    }
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SyncObserver for NoopObserver {
    fn notify(&self, _event: &SyncEvent) {}
}

/// Observer that keeps every event, for tests and embedding.
#[derive(Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<SyncEvent>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return all events seen so far.
    pub fn take(&self) -> Vec<SyncEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl SyncObserver for CollectingObserver {
    fn notify(&self, event: &SyncEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
