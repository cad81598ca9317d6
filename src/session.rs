//! Async session driving one [`SyncEngine`].
//!
//! The session is a tokio task that owns the engine. Commands arrive over an
//! mpsc channel and are handled strictly in arrival order. A command that
//! needs a page fetch does not wait for it: the request runs in its own task
//! and its result re-enters the same channel as a completion message, so
//! toggles and control edits queued in the meantime are handled right away.
//! Out-of-date responses are dropped by the engine's request-id check.
//!
//! ```text
//!  SessionHandle ──Command──▶ ┌───────────────┐ ──ticket──▶ fetch task
//!                             │ session task  │                 │
//!  watch::Receiver ◀─snapshot─│  SyncEngine   │ ◀──completion───┘
//!                             └───────────────┘
//! ```
//!
//! After every message the session publishes a [`SessionSnapshot`] on a
//! watch channel so observers can wait for a state without polling.

use tokio::sync::{mpsc, oneshot, watch};

use selection_sync_core::chart::ChartSeries;
use selection_sync_core::engine::{EngineState, FetchTicket, SyncEngine};
use selection_sync_core::error::{LookupError, NetworkError};
use selection_sync_core::models::{Page, PageState, Record};

const CHANNEL_CAPACITY: usize = 64;

/// Read-only copy of the engine state after a message was handled.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: EngineState,
    pub page: PageState,
    pub records: Vec<Record>,
    pub selection: Vec<Record>,
    pub chart: ChartSeries,
}

impl SessionSnapshot {
    fn of(engine: &SyncEngine) -> Self {
        Self {
            state: engine.state(),
            page: engine.page_state().clone(),
            records: engine.records().to_vec(),
            selection: engine.selection().snapshot_for_persistence(),
            chart: engine.chart().clone(),
        }
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selection.iter().any(|r| r.id == id)
    }
}

enum Message {
    SetPage(u32),
    Search(String),
    SetPageSize(i64),
    Reload,
    Toggle {
        id: i64,
        reply: oneshot::Sender<Result<bool, LookupError>>,
    },
    FetchCompleted(FetchTicket, Result<Page, NetworkError>),
    Barrier(oneshot::Sender<()>),
}

/// Error returned when the session task is gone.
#[derive(Debug, thiserror::Error)]
#[error("session has shut down")]
pub struct SessionClosed;

/// Cloneable handle for sending commands to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Message>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub async fn set_page(&self, page: u32) -> Result<(), SessionClosed> {
        self.send(Message::SetPage(page)).await
    }

    pub async fn search(&self, term: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(Message::Search(term.into())).await
    }

    pub async fn set_page_size(&self, page_size: i64) -> Result<(), SessionClosed> {
        self.send(Message::SetPageSize(page_size)).await
    }

    /// Re-fetch the current page.
    pub async fn reload(&self) -> Result<(), SessionClosed> {
        self.send(Message::Reload).await
    }

    /// Toggle `id` and wait until the change is persisted.
    pub async fn toggle(&self, id: i64) -> Result<Result<bool, LookupError>, SessionClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(Message::Toggle { id, reply }).await?;
        rx.await.map_err(|_| SessionClosed)
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until no fetch is pending, then return the snapshot.
    ///
    /// Commands sent from this handle before the call are handled first.
    pub async fn settled(&self) -> Result<SessionSnapshot, SessionClosed> {
        self.wait_for(|s| s.state != EngineState::FetchingPage).await
    }

    /// Wait until a published snapshot satisfies `predicate`.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<SessionSnapshot, SessionClosed>
    where
        F: FnMut(&SessionSnapshot) -> bool,
    {
        // A round trip through the channel guarantees earlier commands from
        // this handle have been handled before we look at snapshots.
        let (reply, rx) = oneshot::channel();
        self.send(Message::Barrier(reply)).await?;
        rx.await.map_err(|_| SessionClosed)?;

        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| SessionClosed)?;
        Ok(snapshot.clone())
    }

    async fn send(&self, msg: Message) -> Result<(), SessionClosed> {
        self.tx.send(msg).await.map_err(|_| SessionClosed)
    }
}

/// Move `engine` into a new session task and return its handle.
///
/// The task ends when every handle has been dropped and no fetch is in
/// flight. Must be called from within a tokio runtime.
pub fn spawn(engine: SyncEngine) -> SessionHandle {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (snap_tx, snap_rx) = watch::channel(SessionSnapshot::of(&engine));
    let session = Session {
        engine,
        completions: tx.downgrade(),
        snapshots: snap_tx,
    };
    tokio::spawn(session.run(rx));
    SessionHandle {
        tx,
        snapshots: snap_rx,
    }
}

struct Session {
    engine: SyncEngine,
    completions: mpsc::WeakSender<Message>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl Session {
    async fn run(mut self, mut rx: mpsc::Receiver<Message>) {
        while let Some(msg) = rx.recv().await {
            self.handle(msg);
            let _ = self.snapshots.send(SessionSnapshot::of(&self.engine));
        }
        tracing::debug!("session closed");
    }

    fn handle(&mut self, msg: Message) {
        let ticket = match msg {
            Message::SetPage(page) => self.engine.set_page(page),
            Message::Search(term) => self.engine.set_search_term(term),
            Message::SetPageSize(size) => self.engine.set_page_size(size),
            Message::Reload => self.engine.begin_fetch(),
            Message::Toggle { id, reply } => {
                let _ = reply.send(self.engine.toggle(id));
                None
            }
            Message::FetchCompleted(ticket, result) => {
                self.engine.complete_fetch(ticket, result);
                None
            }
            Message::Barrier(reply) => {
                let _ = reply.send(());
                None
            }
        };
        if let Some(ticket) = ticket {
            self.spawn_fetch(ticket);
        }
    }

    fn spawn_fetch(&self, ticket: FetchTicket) {
        let Some(tx) = self.completions.upgrade() else {
            return;
        };
        let source = self.engine.source();
        tokio::spawn(async move {
            let result = source.fetch_page(ticket.query()).await;
            let _ = tx.send(Message::FetchCompleted(ticket, result)).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Notify;

    use selection_sync_core::chart::PaletteColors;
    use selection_sync_core::engine::EngineConfig;
    use selection_sync_core::events::{CollectingObserver, SyncEvent};
    use selection_sync_core::models::PageQuery;
    use selection_sync_core::source::memory::InMemoryRecordSource;
    use selection_sync_core::source::RecordSource;
    use selection_sync_core::store::memory::InMemorySelectionStore;
    use selection_sync_core::store::SelectionStore;

    fn records(n: i64) -> Vec<Record> {
        (1..=n)
            .map(|i| Record::new(i, format!("title {}", i), format!("body {}", i)))
            .collect()
    }

    /// Holds back the response for page 1 until released.
    struct GatedSource {
        inner: InMemoryRecordSource,
        release: Notify,
    }

    #[async_trait]
    impl RecordSource for GatedSource {
        fn name(&self) -> &str {
            "gated"
        }

        async fn fetch_page(&self, query: &PageQuery) -> Result<Page, NetworkError> {
            if query.page == 1 {
                self.release.notified().await;
            }
            self.inner.fetch_page(query).await
        }
    }

    fn engine_with(
        source: Arc<dyn RecordSource>,
        store: Arc<InMemorySelectionStore>,
        events: Arc<CollectingObserver>,
    ) -> SyncEngine {
        SyncEngine::new(
            EngineConfig::default(),
            source,
            store,
            Box::new(PaletteColors::categorical()),
            events,
        )
    }

    #[tokio::test]
    async fn test_reload_loads_and_seeds() {
        let source = Arc::new(InMemoryRecordSource::new(records(12)));
        let store = Arc::new(InMemorySelectionStore::new());
        let events = Arc::new(CollectingObserver::new());
        let session = spawn(engine_with(source, store.clone(), events));

        session.reload().await.unwrap();
        let snap = session.settled().await.unwrap();

        assert_eq!(snap.state, EngineState::PageLoaded);
        assert_eq!(snap.page.total_pages, 3);
        assert_eq!(snap.selection.len(), 5);
        assert_eq!(snap.chart.len(), 5);
        assert_eq!(store.load().unwrap().map(|r| r.len()), Some(5));
    }

    #[tokio::test]
    async fn test_toggle_is_handled_while_fetch_is_pending() {
        let source = Arc::new(InMemoryRecordSource::new(records(12)));
        let store = Arc::new(InMemorySelectionStore::new());
        let events = Arc::new(CollectingObserver::new());
        let session = spawn(engine_with(source, store.clone(), events));

        session.reload().await.unwrap();
        session.settled().await.unwrap();

        // Page 2 fetch goes out; the toggle for a page-1 record that is
        // already selected does not need the page to resolve.
        session.set_page(2).await.unwrap();
        assert_eq!(session.toggle(3).await.unwrap(), Ok(false));
        assert!(!store.load().unwrap().unwrap().iter().any(|r| r.id == 3));

        let snap = session.settled().await.unwrap();
        assert_eq!(snap.page.current_page, 2);
        assert!(!snap.is_selected(3));
        assert_eq!(snap.selection.len(), 4);
    }

    #[tokio::test]
    async fn test_slow_response_for_old_page_is_discarded() {
        let gated = Arc::new(GatedSource {
            inner: InMemoryRecordSource::new(records(12)),
            release: Notify::new(),
        });
        let store = Arc::new(InMemorySelectionStore::new());
        let events = Arc::new(CollectingObserver::new());
        let session = spawn(engine_with(gated.clone(), store, events.clone()));

        session.set_page(1).await.unwrap();
        session.set_page(2).await.unwrap();
        let snap = session
            .wait_for(|s| s.state == EngineState::PageLoaded)
            .await
            .unwrap();
        assert_eq!(snap.records.first().map(|r| r.id), Some(6));

        gated.release.notify_one();
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while !events
                .events()
                .iter()
                .any(|e| matches!(e, SyncEvent::StaleDiscarded { request: 1 }))
            {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        let snap = session.settled().await.unwrap();
        assert_eq!(snap.page.current_page, 2);
        assert_eq!(snap.records.first().map(|r| r.id), Some(6));
        // Seeded from page 2, the first page that actually loaded.
        assert_eq!(
            snap.selection.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![6, 7, 8, 9, 10]
        );
    }

    #[tokio::test]
    async fn test_toggle_unknown_id_reports_lookup_error() {
        let source = Arc::new(InMemoryRecordSource::new(records(3)));
        let store = Arc::new(InMemorySelectionStore::new());
        let events = Arc::new(CollectingObserver::new());
        let session = spawn(engine_with(source, store, events));

        session.reload().await.unwrap();
        session.settled().await.unwrap();
        assert_eq!(
            session.toggle(99).await.unwrap(),
            Err(LookupError::NotOnPage { id: 99 })
        );
    }

    #[tokio::test]
    async fn test_zero_page_size_settles_idle() {
        let source = Arc::new(InMemoryRecordSource::new(records(3)));
        let store = Arc::new(InMemorySelectionStore::new());
        let events = Arc::new(CollectingObserver::new());
        let session = spawn(engine_with(source.clone(), store, events));

        session.set_page_size(0).await.unwrap();
        let snap = session.settled().await.unwrap();
        assert_eq!(snap.state, EngineState::Idle);
        assert!(snap.selection.is_empty());
        assert_eq!(source.calls(), 0);
    }
}
