//! json-server style fixture for the HTTP source and CLI tests.
//!
//! `GET /posts?_page=&_limit=&q=` pages through a fixed record list and sets
//! `x-total-count`. `/broken` always answers 500 and `/garbage` answers 200
//! with a body that is not JSON.

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::collections::HashMap;
use std::sync::Arc;

use selection_sync_core::models::Record;

pub const LONG_TITLE: &str = "sunt aut facere repellat provident occaecati excepturi";

/// `n` posts; every third title contains "qui", post 1 has a long title.
pub fn posts(n: i64) -> Vec<Record> {
    (1..=n)
        .map(|i| {
            let title = if i == 1 {
                LONG_TITLE.to_string()
            } else if i % 3 == 0 {
                format!("post {} qui", i)
            } else {
                format!("post {} est", i)
            };
            Record::new(i, title, format!("body of post {}", i))
        })
        .collect()
}

async fn list_posts(
    State(records): State<Arc<Vec<Record>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if params.get("q").is_some_and(|q| q.is_empty()) {
        return (StatusCode::BAD_REQUEST, "empty q").into_response();
    }
    let page: usize = params.get("_page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = params.get("_limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let term = params.get("q").map(|q| q.to_lowercase()).unwrap_or_default();

    let matching: Vec<&Record> = records
        .iter()
        .filter(|r| {
            term.is_empty()
                || r.title.to_lowercase().contains(&term)
                || r.body.to_lowercase().contains(&term)
        })
        .collect();
    let items: Vec<Record> = matching
        .iter()
        .skip(page.saturating_sub(1) * limit)
        .take(limit)
        .map(|r| (*r).clone())
        .collect();

    (
        [("x-total-count", matching.len().to_string())],
        Json(items),
    )
        .into_response()
}

fn router(records: Vec<Record>) -> Router {
    Router::new()
        .route("/posts", get(list_posts))
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/garbage", get(|| async { "this is not json" }))
        .with_state(Arc::new(records))
}

/// Serve `records` on an ephemeral port and return the base URL.
///
/// The server runs on its own thread so blocking tests can use it too.
pub fn spawn_fixture(records: Vec<Record>) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, router(records)).await.unwrap();
        });
    });

    format!("http://{}", addr)
}

/// A base URL nothing listens on.
pub fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
