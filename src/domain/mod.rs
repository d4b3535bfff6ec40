pub mod board;
pub mod card;
pub mod filter;
pub mod sorting;

pub use board::{Board, BoardMeta, BoardStats, Column, DashboardMeta, DropTarget};
pub use card::{Assignee, Card, CardDraft, CardId, Priority, Subtask, TimeTracking};
pub use filter::{filter_cards, FilteredColumn, Filters};
pub use sorting::{sort_cards, SortField, SortOrder};
