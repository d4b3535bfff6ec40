//! Best-effort persistence of the whole board as one JSON blob.
//!
//! Nothing here returns an error: failed loads read as "no stored board",
//! failed saves are logged and dropped, so callers always keep a usable
//! in-memory board.

use crate::{
    config::{KanbanConfig, DEFAULT_STORAGE_KEY},
    domain::Board,
    storage::Storage,
};
use log::{debug, error, warn};

/// Loads and saves a [`Board`] under a fixed key of a [`Storage`] backend
pub struct BoardStore<S: Storage> {
    storage: S,
    key: String,
}

impl<S: Storage> BoardStore<S> {
    /// Uses the default storage key
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn from_config(storage: S, config: &KanbanConfig) -> Self {
        Self::with_key(storage, config.storage_key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads the stored board. `None` when nothing is stored or the blob
    /// cannot be read or parsed.
    pub async fn load(&self) -> Option<Board> {
        let raw = match self.storage.get_item(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored board under '{}'", self.key);
                return None;
            }
            Err(err) => {
                error!("Failed to load board state: {}", err);
                return None;
            }
        };

        let mut board: Board = match serde_json::from_str(&raw) {
            Ok(board) => board,
            Err(err) => {
                error!("Failed to load board state: {}", err);
                return None;
            }
        };

        let fixed = board.realign_statuses();
        if fixed > 0 {
            warn!(
                "realigned status of {} card(s) with their columns in '{}'",
                fixed, self.key
            );
        }
        Some(board)
    }

    /// Stored board, or a fresh one seeded from `config`
    pub async fn load_or_default(&self, config: &KanbanConfig) -> Board {
        match self.load().await {
            Some(board) => board,
            None => Board::from_config(config),
        }
    }

    /// Writes the board. Failures are logged, never returned.
    pub async fn save(&self, board: &Board) {
        let json = match serde_json::to_string(board) {
            Ok(json) => json,
            Err(err) => {
                error!("Failed to save board state: {}", err);
                return;
            }
        };

        match self.storage.set_item(&self.key, &json).await {
            Ok(()) => debug!("saved board under '{}' ({} bytes)", self.key, json.len()),
            Err(err) => error!("Failed to save board state: {}", err),
        }
    }

    /// Removes the stored board, if any
    pub async fn clear(&self) {
        if let Err(err) = self.storage.remove_item(&self.key).await {
            error!("Failed to clear board state: {}", err);
        }
    }
}
