//! Engine construction from configuration.
//!
//! Resolves the configured record source, selection store and color
//! generator and hands them to a fresh [`SyncEngine`]. Embedders that bring
//! their own collaborators call [`build_engine_with`].

use anyhow::Result;
use std::sync::Arc;

use selection_sync_core::chart::{Color, ColorGenerator, PaletteColors, RandomColors};
use selection_sync_core::engine::SyncEngine;
use selection_sync_core::events::SyncObserver;
use selection_sync_core::source::RecordSource;
use selection_sync_core::store::SelectionStore;

use crate::config::{ChartConfig, Config};
use crate::file_store::JsonFileStore;
use crate::http_source::HttpRecordSource;

/// Build an engine with the HTTP source and JSON file store from `config`.
///
/// The persisted selection is restored as part of construction.
pub fn build_engine(config: &Config, observer: Arc<dyn SyncObserver>) -> Result<SyncEngine> {
    let source = Arc::new(HttpRecordSource::new(&config.source)?);
    let store = Arc::new(JsonFileStore::from_config(&config.storage));
    Ok(build_engine_with(config, source, store, observer))
}

/// Build an engine from `config` with explicit collaborators.
pub fn build_engine_with(
    config: &Config,
    source: Arc<dyn RecordSource>,
    store: Arc<dyn SelectionStore>,
    observer: Arc<dyn SyncObserver>,
) -> SyncEngine {
    SyncEngine::new(
        config.engine_config(),
        source,
        store,
        create_color_generator(&config.chart),
        observer,
    )
}

/// Instantiate the color generator named by `chart.colors`.
pub fn create_color_generator(config: &ChartConfig) -> Box<dyn ColorGenerator> {
    match config.colors.as_str() {
        "palette" => Box::new(PaletteColors::new(
            config.palette.iter().map(Color::new).collect(),
        )),
        _ => Box::new(RandomColors),
    }
}
