//! TOML configuration.
//!
//! Every section is optional; a missing file is equivalent to
//! [`Config::minimal`]. See `config/selsync.example.toml` for all keys.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use selection_sync_core::engine::EngineConfig;
use selection_sync_core::store::DEFAULT_SLOT;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub paging: PagingConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub chart: ChartConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_resource")]
    pub resource: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            resource: default_resource(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://jsonplaceholder.typicode.com".to_string()
}
fn default_resource() -> String {
    "posts".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct PagingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> i64 {
    5
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SelectionConfig {
    /// Records of the first page to pre-select. Follows the page size when unset.
    #[serde(default)]
    pub seed_limit: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    #[serde(default = "default_slot")]
    pub slot: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            slot: default_slot(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/selection.json")
}
fn default_slot() -> String {
    DEFAULT_SLOT.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    /// `"random"` or `"palette"`.
    #[serde(default = "default_colors")]
    pub colors: String,
    /// Custom palette for `colors = "palette"`; the built-in one when empty.
    #[serde(default)]
    pub palette: Vec<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            colors: default_colors(),
            palette: Vec::new(),
        }
    }
}

fn default_colors() -> String {
    "random".to_string()
}

impl Config {
    /// All defaults. Used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            page_size: self.paging.page_size,
            seed_limit: self.selection.seed_limit,
        }
    }
}

/// Read and validate a config file. A missing file yields [`Config::minimal`].
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(Config::minimal());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?;
    Ok(config)
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    // Validate source
    let base_url = config.source.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        anyhow::bail!(
            "source.base_url must be an http(s) URL, got '{}'",
            config.source.base_url
        );
    }
    if config.source.resource.trim().is_empty() {
        anyhow::bail!("source.resource must not be empty");
    }
    if config.source.timeout_secs == 0 {
        anyhow::bail!("source.timeout_secs must be > 0");
    }

    // Validate storage
    if config.storage.slot.trim().is_empty() {
        anyhow::bail!("storage.slot must not be empty");
    }

    // Validate chart
    match config.chart.colors.as_str() {
        "random" | "palette" => {}
        other => anyhow::bail!(
            "Unknown chart.colors: '{}'. Must be random or palette.",
            other
        ),
    }
    for color in &config.chart.palette {
        if !is_hex_color(color) {
            anyhow::bail!("chart.palette entries must look like #RRGGBB, got '{}'", color);
        }
    }

    Ok(config)
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
