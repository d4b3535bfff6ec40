//! # Kanban Core
//!
//! Board state engine, time tracking and local persistence for a
//! single-user kanban board.
//!
//! The crate owns the board data and every operation on it (moving cards,
//! toggling subtasks and timers, adding columns, filtering) without any
//! dependency on a particular UI. Persistence is a best-effort JSON blob
//! kept under one key of a pluggable key-value store.

pub mod config;
pub mod domain;
pub mod error;
pub mod storage;
pub mod time;

// Re-export commonly used types
pub use config::KanbanConfig;
pub use domain::{
    board::{Board, Column, DropTarget},
    card::{Assignee, Card, CardDraft, CardId, Priority, Subtask},
    filter::{filter_cards, Filters},
};
pub use error::{KanbanError, Result};
pub use storage::{BoardStore, Storage};
pub use time::{countdown, format_minutes, Countdown, Tone};
