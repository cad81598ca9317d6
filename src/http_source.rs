//! HTTP record source.
//!
//! Pages through a JSON REST collection using the json-server query
//! dialect served by JSONPlaceholder and compatible mock APIs:
//!
//! ```text
//! GET {base_url}/{resource}?_page=2&_limit=5&q=dolor
//! x-total-count: 100
//!
//! [{ "userId": 1, "id": 6, "title": "...", "body": "..." }, ...]
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [source]
//! base_url = "https://jsonplaceholder.typicode.com"
//! resource = "posts"
//! timeout_secs = 30
//! ```
//!
//! # Errors
//!
//! | Condition | Result |
//! |-----------|--------|
//! | Connect failure, timeout | [`NetworkError::Transport`] |
//! | Non-2xx status | [`NetworkError::Status`] |
//! | Body is not a record array | [`NetworkError::Decode`] |
//!
//! A missing or unparseable `x-total-count` header is not an error; the
//! number of returned items is used instead.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use selection_sync_core::error::NetworkError;
use selection_sync_core::models::{Page, PageQuery, Record};
use selection_sync_core::source::RecordSource;

use crate::config::SourceConfig;

/// Header carrying the number of records matching the query.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// A [`RecordSource`] backed by a json-server style REST endpoint.
pub struct HttpRecordSource {
    /// Label used in logs (`"http:<resource>"`).
    name: String,
    /// Full collection URL, e.g. `https://host/posts`.
    endpoint: String,
    client: reqwest::Client,
}

impl HttpRecordSource {
    /// Build a source from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let endpoint = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.resource.trim_matches('/')
        );

        Ok(Self {
            name: format!("http:{}", config.resource.trim_matches('/')),
            endpoint,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_page(&self, query: &PageQuery) -> Result<Page, NetworkError> {
        let mut params = vec![
            ("_page", query.page.to_string()),
            ("_limit", query.page_size.to_string()),
        ];
        if !query.search_term.is_empty() {
            params.push(("q", query.search_term.clone()));
        }

        tracing::debug!(
            "GET {} page={} limit={} q={:?}",
            self.endpoint,
            query.page,
            query.page_size,
            query.search_term
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| NetworkError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(NetworkError::Status {
                status: status.as_u16(),
                message: body_text,
            });
        }

        let total_header = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let items: Vec<Record> = response
            .json()
            .await
            .map_err(|e| NetworkError::Decode(e.to_string()))?;

        let total_count = parse_total_count(total_header.as_deref(), items.len());
        Ok(Page::new(items, total_count))
    }
}

/// Interpret the total-count header, falling back to `item_count`.
fn parse_total_count(header: Option<&str>, item_count: usize) -> u64 {
    match header.map(|h| h.trim().parse::<u64>()) {
        Some(Ok(total)) => total,
        Some(Err(_)) => {
            tracing::warn!("ignoring unparseable {} header", TOTAL_COUNT_HEADER);
            item_count as u64
        }
        None => item_count as u64,
    }
}
