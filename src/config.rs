//! Board configuration: where state is stored and which columns a fresh
//! board starts with.

use crate::error::{KanbanError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Key the board blob is stored under
pub const DEFAULT_STORAGE_KEY: &str = "bumble-kanban-state";

/// Directory file-backed storage writes into
pub const DEFAULT_DATA_DIR: &str = ".kanban";

/// Column seeded into a fresh board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub id: String,
    pub title: String,
}

impl ColumnSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KanbanConfig {
    pub storage_key: String,
    pub data_dir: PathBuf,
    pub columns: Vec<ColumnSpec>,
}

impl Default for KanbanConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            columns: vec![
                ColumnSpec::new("backlog", "Backlog"),
                ColumnSpec::new("in-progress", "In Progress"),
                ColumnSpec::new("review", "Review"),
                ColumnSpec::new("done", "Done"),
            ],
        }
    }
}

impl KanbanConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).await.map_err(|e| {
            KanbanError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the storage key is set and column ids are non-empty and unique
    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(KanbanError::ConfigError(
                "storage_key must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.id.trim().is_empty() {
                return Err(KanbanError::ConfigError(format!(
                    "column '{}' has an empty id",
                    column.title
                )));
            }
            if !seen.insert(column.id.as_str()) {
                return Err(KanbanError::ConfigError(format!(
                    "duplicate column id '{}'",
                    column.id
                )));
            }
        }
        Ok(())
    }
}
