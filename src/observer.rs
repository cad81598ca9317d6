//! Engine event reporting for the CLI.
//!
//! Engine events are written to **stderr** so stdout stays parseable for
//! scripts (tables, chart JSON). Human mode prints one short line per event;
//! JSON mode prints one object per line.

use std::io::Write;
use std::sync::Arc;

use selection_sync_core::events::{NoopObserver, SyncEvent, SyncObserver};

/// Human-friendly event lines on stderr: `fetch  page 2 (5 per page)`.
pub struct StderrObserver;

impl SyncObserver for StderrObserver {
    fn notify(&self, event: &SyncEvent) {
        let line = format!("{}\n", describe(event));
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// One JSON object per event on stderr.
pub struct JsonObserver;

impl SyncObserver for JsonObserver {
    fn notify(&self, event: &SyncEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }
}

fn describe(event: &SyncEvent) -> String {
    match event {
        SyncEvent::SelectionRestored { count } => {
            format!("restore  {} selected records", count)
        }
        SyncEvent::FetchStarted {
            page,
            page_size,
            search_term,
            ..
        } => {
            if search_term.is_empty() {
                format!("fetch  page {} ({} per page)", page, page_size)
            } else {
                format!(
                    "fetch  page {} ({} per page, search {:?})",
                    page, page_size, search_term
                )
            }
        }
        SyncEvent::PageLoaded {
            page,
            total_pages,
            items,
            ..
        } => format!(
            "loaded  page {} of {}, {} records",
            page,
            total_pages,
            items.len()
        ),
        SyncEvent::FetchFailed { error, .. } => format!("fetch failed  {}", error),
        SyncEvent::StaleDiscarded { request } => {
            format!("stale  dropped response for request {}", request)
        }
        SyncEvent::Seeded { count } => format!("seed  selected first {} records", count),
        SyncEvent::SelectionChanged { id, selected } => {
            format!("{}  {}", if *selected { "select" } else { "deselect" }, id)
        }
        SyncEvent::PersistFailed { error } => format!("persist failed  {}", error),
    }
}

/// Event mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum EventMode {
    Off,
    Human,
    Json,
}

impl EventMode {
    /// Default: human events when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            EventMode::Human
        } else {
            EventMode::Off
        }
    }

    pub fn observer(&self) -> Arc<dyn SyncObserver> {
        match self {
            EventMode::Off => Arc::new(NoopObserver),
            EventMode::Human => Arc::new(StderrObserver),
            EventMode::Json => Arc::new(JsonObserver),
        }
    }
}
