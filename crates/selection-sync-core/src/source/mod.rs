//! Record source abstraction.
//!
//! A [`RecordSource`] serves pages of records for a search term. The engine
//! never talks to a network directly; the HTTP implementation lives in the
//! application crate, and [`memory::InMemoryRecordSource`] serves fixtures.

pub mod memory;

use async_trait::async_trait;

use crate::error::NetworkError;
use crate::models::{Page, PageQuery};

/// A paged, searchable collection of records.
///
/// Called from the tokio runtime in the application; implementations may
/// perform network I/O.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use selection_sync_core::error::NetworkError;
/// use selection_sync_core::models::{Page, PageQuery, Record};
/// use selection_sync_core::source::RecordSource;
///
/// struct Fixed;
///
/// #[async_trait]
/// impl RecordSource for Fixed {
///     fn name(&self) -> &str { "fixed" }
///
///     async fn fetch_page(&self, _query: &PageQuery) -> Result<Page, NetworkError> {
///         Ok(Page::new(vec![Record::new(1, "only", "record")], 1))
///     }
/// }
/// ```
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short label used in logs (e.g. `"http:posts"`).
    fn name(&self) -> &str;

    /// Fetch one page of records matching `query.search_term`.
    ///
    /// `total_count` in the returned page counts all matching records, not
    /// only the ones on this page.
    async fn fetch_page(&self, query: &PageQuery) -> Result<Page, NetworkError>;
}
