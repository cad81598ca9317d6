//! JSON file [`SelectionStore`].
//!
//! The file holds a JSON object mapping slot names to selections, the same
//! shape as a browser's local storage:
//!
//! ```json
//! { "selectedData": [ { "id": 1, "title": "...", "body": "..." } ] }
//! ```
//!
//! Saving rewrites only the configured slot and keeps any other keys. Writes
//! go to a temp file in the same directory which then replaces the original,
//! so a crash never leaves a half-written file behind.

use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

use selection_sync_core::error::StorageError;
use selection_sync_core::models::Record;
use selection_sync_core::store::SelectionStore;

use crate::config::StorageConfig;

pub struct JsonFileStore {
    path: PathBuf,
    slot: String,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, slot: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            slot: slot.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.path.clone(), config.slot.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_object(&self) -> Result<Option<Map<String, Value>>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(StorageError::Corrupt {
                slot: self.slot.clone(),
                reason: format!("{} is not a JSON object", self.path.display()),
            }),
        }
    }
}

impl SelectionStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<Record>>, StorageError> {
        let Some(mut map) = self.read_object()? else {
            return Ok(None);
        };
        match map.remove(&self.slot) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StorageError::Corrupt {
                    slot: self.slot.clone(),
                    reason: e.to_string(),
                }),
        }
    }

    fn save(&self, selection: &[Record]) -> Result<(), StorageError> {
        let mut map = match self.read_object() {
            Ok(existing) => existing.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    "overwriting unreadable selection file {}: {}",
                    self.path.display(),
                    e
                );
                Map::new()
            }
        };
        map.insert(self.slot.clone(), serde_json::to_value(selection)?);

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, &Value::Object(map))?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }
}
