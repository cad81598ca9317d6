//! # Selection Sync
//!
//! Keep a bar chart in step with records picked from a paginated API.
//!
//! The engine itself lives in `selection-sync-core` and knows nothing about
//! HTTP, files or terminals. This crate supplies those pieces: a
//! [`RecordSource`](selection_sync_core::source::RecordSource) over a JSON
//! REST endpoint, a [`SelectionStore`](selection_sync_core::store::SelectionStore)
//! backed by a JSON file, an async session that keeps toggles responsive
//! while pages load, and the `selsync` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ HTTP source  │──▶│  SyncEngine  │──▶│  JSON file   │
//! │ _page/_limit │   │ seed/toggle  │   │ selectedData │
//! └──────────────┘   └──────┬───────┘   └──────────────┘
//!                           │ chart
//!                 ┌─────────┴─────────┐
//!                 ▼                   ▼
//!           ┌──────────┐        ┌──────────┐
//!           │   text   │        │  Plotly  │
//!           │  render  │        │   JSON   │
//!           └──────────┘        └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! selsync page                       # first page, pre-selects it
//! selsync toggle 3                   # deselect record 3
//! selsync page --page 2 --search qui
//! selsync chart --format json
//! selsync interactive
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`app`] | Engine construction from config |
//! | [`http_source`] | Paginated JSON API client |
//! | [`file_store`] | JSON file selection store |
//! | [`session`] | Async command loop around the engine |
//! | [`observer`] | Engine events on stderr |
//! | [`render`] | Text tables and charts |
//! | [`page_cmd`] | `page` and `toggle` commands |
//! | [`selection_cmd`] | `selection` and `chart` commands |
//! | [`interactive`] | `interactive` command |

pub mod app;
pub mod config;
pub mod file_store;
pub mod http_source;
pub mod interactive;
pub mod observer;
pub mod page_cmd;
pub mod render;
pub mod selection_cmd;
pub mod session;
