//! `selsync selection` and `selsync chart`.
//!
//! These read the persisted selection directly and never touch the record
//! source, so they work offline.

use anyhow::{Context, Result};

use selection_sync_core::chart::{self, ChartSeries};
use selection_sync_core::models::Record;
use selection_sync_core::store::SelectionStore;

use crate::app;
use crate::config::Config;
use crate::file_store::JsonFileStore;
use crate::render;

#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ChartFormat {
    /// One text bar per selected record.
    Table,
    /// A Plotly bar trace.
    Json,
}

fn load_selection(config: &Config) -> Result<Vec<Record>> {
    let store = JsonFileStore::from_config(&config.storage);
    let stored = store
        .load()
        .with_context(|| format!("Failed to read selection from {}", store.path().display()))?;
    Ok(stored.unwrap_or_default())
}

pub fn run_selection(config: &Config) -> Result<()> {
    let selection = load_selection(config)?;
    print!("{}", render::selection_list(&selection));
    Ok(())
}

/// Chart for the persisted selection, with fresh colors.
pub fn persisted_chart(config: &Config) -> Result<ChartSeries> {
    let selection = load_selection(config)?;
    let mut colors = app::create_color_generator(&config.chart);
    Ok(chart::rebuild_full(&selection, colors.as_mut()))
}

pub fn run_chart(config: &Config, format: ChartFormat) -> Result<()> {
    let series = persisted_chart(config)?;
    match format {
        ChartFormat::Table => print!("{}", render::chart_text(&series)),
        ChartFormat::Json => println!("{}", serde_json::to_string_pretty(&series.to_plotly_trace())?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(tmp: &TempDir) -> Config {
        let mut config = Config::minimal();
        config.storage.path = tmp.path().join("selection.json");
        config.chart.colors = "palette".to_string();
        config
    }

    #[test]
    fn test_persisted_chart_follows_selection_order() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        JsonFileStore::from_config(&config.storage)
            .save(&[Record::new(9, "nine", ""), Record::new(2, "two", "")])
            .unwrap();

        let series = persisted_chart(&config).unwrap();
        assert_eq!(series.y, vec![9, 2]);
        assert_eq!(series.x, vec!["nine", "two"]);
        assert_eq!(series.colors[0].as_str(), "#1F77B4");
        assert!(series.is_aligned());
    }

    #[test]
    fn test_persisted_chart_empty_without_file() {
        let tmp = TempDir::new().unwrap();
        let series = persisted_chart(&config_in(&tmp)).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_corrupt_store_is_reported() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        std::fs::write(&config.storage.path, "not json").unwrap();
        let err = persisted_chart(&config).unwrap_err();
        assert!(err.to_string().contains("Failed to read selection"));
    }
}
