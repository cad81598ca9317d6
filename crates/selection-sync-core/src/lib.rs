//! # selection-sync core
//!
//! Runtime-agnostic logic for selection-sync: data models, the selection
//! set, incremental chart derivation, the store and record-source traits,
//! and the [`engine::SyncEngine`] that ties them together.
//!
//! This crate contains no tokio, HTTP client, or filesystem I/O. Concrete
//! collaborators (HTTP source, JSON file store) live in the application
//! crate; in-memory versions for tests live here.

pub mod chart;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod selection;
pub mod source;
pub mod store;
