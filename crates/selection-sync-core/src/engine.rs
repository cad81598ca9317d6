//! The selection-to-chart synchronization engine.
//!
//! [`SyncEngine`] owns the page state, the currently loaded records, the
//! [`SelectionSet`] and the derived [`ChartSeries`], and is the only place
//! any of them change. Collaborators are injected at construction:
//!
//! ```text
//! RecordSource ──page──▶ SyncEngine ──seed once──▶ SelectionSet
//!                            │  toggle                   │
//!                            ▼                           ▼
//!                    ChartSeries (incremental)   SelectionStore (snapshot)
//! ```
//!
//! # State machine
//!
//! `Idle → FetchingPage → PageLoaded`. Any change of page, search term or
//! page size issues a new request and re-enters `FetchingPage`. A page size
//! of zero or less issues nothing and leaves the engine `Idle`.
//!
//! # Fetch protocol
//!
//! Fetching is split so a caller can run the request elsewhere while the
//! engine keeps handling toggles:
//!
//! 1. [`begin_fetch`](SyncEngine::begin_fetch) (or one of the setters)
//!    returns a [`FetchTicket`] carrying a request id and the query.
//! 2. The caller awaits [`RecordSource::fetch_page`] with that query.
//! 3. [`complete_fetch`](SyncEngine::complete_fetch) applies the result only
//!    if the ticket is still the latest request; older responses are
//!    discarded.
//!
//! [`refresh`](SyncEngine::refresh) runs all three steps in sequence.

use std::sync::Arc;

use crate::chart::{self, ChartSeries, ColorGenerator};
use crate::error::{LookupError, NetworkError};
use crate::events::{SyncEvent, SyncObserver};
use crate::models::{total_pages, Page, PageQuery, PageState, Record};
use crate::selection::{SelectionSet, Toggled};
use crate::source::RecordSource;
use crate::store::SelectionStore;

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Initial records per page.
    pub page_size: i64,
    /// How many records of the first page to pre-select. `None` follows the
    /// page size in effect when the first page loads.
    pub seed_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            seed_limit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    FetchingPage,
    PageLoaded,
}

/// Handle for one issued page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    request: u64,
    query: PageQuery,
}

impl FetchTicket {
    pub fn request(&self) -> u64 {
        self.request
    }

    pub fn query(&self) -> &PageQuery {
        &self.query
    }
}

/// What [`SyncEngine::complete_fetch`] did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was applied.
    Loaded,
    /// The request failed; the previous page was kept.
    Failed(NetworkError),
    /// A newer request had been issued; the response was dropped.
    Stale,
}

pub struct SyncEngine {
    config: EngineConfig,
    source: Arc<dyn RecordSource>,
    store: Arc<dyn SelectionStore>,
    colors: Box<dyn ColorGenerator>,
    observer: Arc<dyn SyncObserver>,
    state: EngineState,
    page: PageState,
    records: Vec<Record>,
    selection: SelectionSet,
    chart: ChartSeries,
    latest_request: u64,
    has_loaded: bool,
}

impl SyncEngine {
    /// Build an engine and restore any persisted selection.
    ///
    /// A persisted selection is charted with fresh colors. If the store
    /// cannot be read the session starts with an empty selection.
    pub fn new(
        config: EngineConfig,
        source: Arc<dyn RecordSource>,
        store: Arc<dyn SelectionStore>,
        colors: Box<dyn ColorGenerator>,
        observer: Arc<dyn SyncObserver>,
    ) -> Self {
        let page = PageState::new(config.page_size);
        let mut engine = Self {
            config,
            source,
            store,
            colors,
            observer,
            state: EngineState::Idle,
            page,
            records: Vec::new(),
            selection: SelectionSet::new(),
            chart: ChartSeries::new(),
            latest_request: 0,
            has_loaded: false,
        };
        engine.restore_persisted();
        engine
    }

    fn restore_persisted(&mut self) {
        match self.store.load() {
            Ok(Some(records)) => {
                self.selection.restore(records);
                self.chart = chart::rebuild_full(self.selection.iter(), self.colors.as_mut());
                tracing::debug!("restored {} selected records", self.selection.len());
                self.observer.notify(&SyncEvent::SelectionRestored {
                    count: self.selection.len(),
                });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("could not load persisted selection, starting empty: {}", e);
            }
        }
    }

    // ── Paging controls ────────────────────────────────────────────────

    /// Show page `page` (clamped to at least 1).
    pub fn set_page(&mut self, page: u32) -> Option<FetchTicket> {
        self.page.current_page = page.max(1);
        self.begin_fetch()
    }

    /// Filter by `term`, returning to the first page.
    pub fn set_search_term(&mut self, term: impl Into<String>) -> Option<FetchTicket> {
        self.page.search_term = term.into();
        self.page.current_page = 1;
        self.begin_fetch()
    }

    /// Change the number of records per page. Values ≤ 0 stop fetching.
    pub fn set_page_size(&mut self, page_size: i64) -> Option<FetchTicket> {
        self.page.page_size = page_size;
        self.begin_fetch()
    }

    /// Set page, page size and search term together, issuing one request.
    pub fn set_query(
        &mut self,
        page: u32,
        page_size: i64,
        search_term: impl Into<String>,
    ) -> Option<FetchTicket> {
        self.page.current_page = page.max(1);
        self.page.page_size = page_size;
        self.page.search_term = search_term.into();
        self.begin_fetch()
    }

    /// Issue a request for the current page state.
    ///
    /// Every call supersedes earlier requests, including calls that issue
    /// nothing because the page size is degenerate.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        self.latest_request += 1;
        let Some(query) = self.page.query() else {
            tracing::debug!("page size {} suppresses fetching", self.page.page_size);
            self.state = EngineState::Idle;
            return None;
        };

        self.state = EngineState::FetchingPage;
        let ticket = FetchTicket {
            request: self.latest_request,
            query,
        };
        self.observer.notify(&SyncEvent::FetchStarted {
            request: ticket.request,
            page: ticket.query.page,
            page_size: ticket.query.page_size,
            search_term: ticket.query.search_term.clone(),
        });
        Some(ticket)
    }

    /// Apply the response for `ticket`.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page, NetworkError>,
    ) -> FetchOutcome {
        if ticket.request != self.latest_request {
            tracing::debug!(
                "discarding response for request {} (latest is {})",
                ticket.request,
                self.latest_request
            );
            self.observer.notify(&SyncEvent::StaleDiscarded {
                request: ticket.request,
            });
            return FetchOutcome::Stale;
        }

        match result {
            Ok(page) => {
                self.page.total_pages = total_pages(page.total_count, ticket.query.page_size);
                self.records = page.items;
                self.state = EngineState::PageLoaded;
                self.has_loaded = true;
                self.observer.notify(&SyncEvent::PageLoaded {
                    request: ticket.request,
                    page: ticket.query.page,
                    total_pages: self.page.total_pages,
                    items: self.records.clone(),
                });
                if !self.selection.is_seeded() {
                    self.seed_from_current_page(ticket.query.page_size);
                }
                FetchOutcome::Loaded
            }
            Err(e) => {
                tracing::error!(
                    "fetching page {} from {} failed: {}",
                    ticket.query.page,
                    self.source.name(),
                    e
                );
                self.state = if self.has_loaded {
                    EngineState::PageLoaded
                } else {
                    EngineState::Idle
                };
                self.observer.notify(&SyncEvent::FetchFailed {
                    request: ticket.request,
                    error: e.to_string(),
                });
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Fetch the current page and apply it.
    ///
    /// Returns `None` when the page size suppresses fetching.
    pub async fn refresh(&mut self) -> Option<FetchOutcome> {
        let ticket = self.begin_fetch()?;
        let source = Arc::clone(&self.source);
        let result = source.fetch_page(ticket.query()).await;
        Some(self.complete_fetch(ticket, result))
    }

    fn seed_from_current_page(&mut self, page_size: u32) {
        let limit = self.config.seed_limit.unwrap_or(page_size as usize);
        let added = self.selection.seed_if_empty(&self.records, limit);
        if added.is_empty() {
            return;
        }
        let mut series = std::mem::take(&mut self.chart);
        for record in &added {
            series = chart::derive_on_add(series, record, self.colors.as_mut());
        }
        self.chart = series;
        tracing::info!("seeded selection with {} records", added.len());
        self.observer
            .notify(&SyncEvent::Seeded { count: added.len() });
        self.persist();
    }

    // ── Selection ──────────────────────────────────────────────────────

    /// Flip membership of `id`, which must be on the loaded page when it is
    /// not already selected.
    ///
    /// The chart is updated incrementally and the new snapshot is written
    /// before this returns. Returns whether `id` is selected afterwards.
    pub fn toggle(&mut self, id: i64) -> Result<bool, LookupError> {
        let records = &self.records;
        let toggled = self
            .selection
            .toggle(id, |id| records.iter().find(|r| r.id == id).cloned())
            .inspect_err(|e| tracing::warn!("ignoring toggle: {}", e))?;

        let series = std::mem::take(&mut self.chart);
        self.chart = match &toggled {
            Toggled::Added(record) => chart::derive_on_add(series, record, self.colors.as_mut()),
            Toggled::Removed(record) => chart::derive_on_remove(series, record),
        };

        self.persist();
        let selected = toggled.is_selected();
        self.observer
            .notify(&SyncEvent::SelectionChanged { id, selected });
        Ok(selected)
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.selection.snapshot_for_persistence()) {
            tracing::warn!("failed to persist selection: {}", e);
            self.observer.notify(&SyncEvent::PersistFailed {
                error: e.to_string(),
            });
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn page_state(&self) -> &PageState {
        &self.page
    }

    /// Records of the currently loaded page.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn chart(&self) -> &ChartSeries {
        &self.chart
    }

    pub fn is_seeded(&self) -> bool {
        self.selection.is_seeded()
    }

    pub fn source(&self) -> Arc<dyn RecordSource> {
        Arc::clone(&self.source)
    }
}
