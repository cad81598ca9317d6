//! In-memory [`RecordSource`] over a fixed list of records.
//!
//! Search is a case-insensitive substring match on title and body, the
//! same way the remote full-text `q` filter behaves for plain words.
//! Failures can be injected to exercise the engine's recovery paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::NetworkError;
use crate::models::{Page, PageQuery, Record};

use super::RecordSource;

pub struct InMemoryRecordSource {
    records: Vec<Record>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl InMemoryRecordSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make subsequent fetches fail with a transport error.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of `fetch_page` calls so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Apply `query` to the fixture list.
    pub fn page_for(&self, query: &PageQuery) -> Page {
        let term = query.search_term.to_lowercase();
        let matching: Vec<&Record> = self
            .records
            .iter()
            .filter(|r| {
                term.is_empty()
                    || r.title.to_lowercase().contains(&term)
                    || r.body.to_lowercase().contains(&term)
            })
            .collect();

        let size = query.page_size as usize;
        let start = (query.page.max(1) as usize - 1).saturating_mul(size);
        let items = matching
            .iter()
            .skip(start)
            .take(size)
            .map(|r| (*r).clone())
            .collect();
        Page::new(items, matching.len() as u64)
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_page(&self, query: &PageQuery) -> Result<Page, NetworkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(NetworkError::Transport("connection refused".to_string()));
        }
        Ok(self.page_for(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> InMemoryRecordSource {
        InMemoryRecordSource::new(
            (1..=12)
                .map(|i| Record::new(i, format!("Post {}", i), if i % 3 == 0 { "fizz" } else { "plain" }))
                .collect(),
        )
    }

    fn query(page: u32, page_size: u32, term: &str) -> PageQuery {
        PageQuery {
            page,
            page_size,
            search_term: term.to_string(),
        }
    }

    #[tokio::test]
    async fn test_pages_are_contiguous() {
        let src = source();
        let p1 = src.fetch_page(&query(1, 5, "")).await.unwrap();
        let p3 = src.fetch_page(&query(3, 5, "")).await.unwrap();
        assert_eq!(p1.items.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert_eq!(p3.items.iter().map(|r| r.id).collect::<Vec<_>>(), vec![11, 12]);
        assert_eq!(p1.total_count, 12);
    }

    #[tokio::test]
    async fn test_search_filters_and_counts() {
        let src = source();
        let page = src.fetch_page(&query(1, 10, "FIZZ")).await.unwrap();
        assert_eq!(page.total_count, 4);
        assert!(page.items.iter().all(|r| r.id % 3 == 0));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let src = source();
        src.set_failing(true);
        assert!(src.fetch_page(&query(1, 5, "")).await.is_err());
        assert_eq!(src.calls(), 1);
    }
}
