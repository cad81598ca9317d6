//! Core data models shared by the engine and its collaborators.
//!
//! These types describe the records that flow in from a record source, the
//! paging request sent to it, and the page state the engine tracks.

use serde::{Deserialize, Serialize};

/// A single record as served by the remote paging API.
///
/// Records are immutable once fetched. Fields other than `id`, `title` and
/// `body` (for example `userId` on the JSON-placeholder API) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub title: String,
    pub body: String,
}

impl Record {
    pub fn new(id: i64, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
        }
    }

    /// Hover text shown for this record in the chart.
    pub fn hover_text(&self) -> String {
        format!("ID: {}", self.id)
    }
}

/// Parameters of a single page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: u32,
    /// Number of records per page. Always ≥ 1 when issued by the engine.
    pub page_size: u32,
    /// Free-text search term; empty matches everything.
    pub search_term: String,
}

/// One page of records plus the total number of matching records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<Record>,
    pub total_count: u64,
}

impl Page {
    pub fn new(items: Vec<Record>, total_count: u64) -> Self {
        Self { items, total_count }
    }
}

/// Paging controls driving record source queries.
///
/// `page_size` mirrors the user-editable "number to show" field and may hold
/// zero or a negative value, in which case no fetch is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub current_page: u32,
    pub page_size: i64,
    pub search_term: String,
    pub total_pages: u32,
}

impl PageState {
    pub fn new(page_size: i64) -> Self {
        Self {
            current_page: 1,
            page_size,
            search_term: String::new(),
            total_pages: 1,
        }
    }

    /// The query for the current controls, or `None` when the page size
    /// would make the request degenerate.
    pub fn query(&self) -> Option<PageQuery> {
        let page_size = u32::try_from(self.page_size).ok().filter(|s| *s > 0)?;
        Some(PageQuery {
            page: self.current_page.max(1),
            page_size,
            search_term: self.search_term.clone(),
        })
    }
}

/// Number of pages needed to show `total_count` records, never less than 1.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(100, 5), 20);
        assert_eq!(total_pages(101, 5), 21);
        assert_eq!(total_pages(4, 5), 1);
    }

    #[test]
    fn test_total_pages_never_zero() {
        assert_eq!(total_pages(0, 5), 1);
        assert_eq!(total_pages(10, 0), 1);
    }

    #[test]
    fn test_query_suppressed_for_degenerate_page_size() {
        assert!(PageState::new(0).query().is_none());
        assert!(PageState::new(-3).query().is_none());
        let q = PageState::new(5).query().unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 5);
        assert_eq!(q.search_term, "");
    }

    #[test]
    fn test_record_ignores_unknown_fields() {
        let json = r#"{"userId": 1, "id": 7, "title": "t", "body": "b"}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record, Record::new(7, "t", "b"));
        assert_eq!(record.hover_text(), "ID: 7");
    }
}
