use crate::config::{ColumnSpec, KanbanConfig};
use crate::domain::card::{Card, CardId};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A lane on the board holding cards in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            cards: Vec::new(),
        }
    }

    fn position_of(&self, card_id: &CardId) -> Option<usize> {
        self.cards.iter().position(|card| &card.id == card_id)
    }
}

/// Dashboard descriptor carried in board metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMeta {
    pub id: String,
    pub path: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardMeta {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboards: Option<Vec<DashboardMeta>>,
}

impl Default for BoardMeta {
    fn default() -> Self {
        Self {
            version: Board::CURRENT_VERSION,
            dashboards: None,
        }
    }
}

/// Where a dragged card was released
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Dropped onto another card
    Card(CardId),
    /// Dropped onto a column's empty area
    Column(String),
}

/// Column and card totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardStats {
    pub total_columns: usize,
    pub total_cards: usize,
}

/// Kanban board state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub columns: Vec<Column>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub meta: BoardMeta,
}

impl Board {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            last_updated: Utc::now(),
            meta: BoardMeta::default(),
        }
    }

    /// Fresh board with the configured columns and no cards
    pub fn from_config(config: &KanbanConfig) -> Self {
        Self::new(
            config
                .columns
                .iter()
                .map(|ColumnSpec { id, title }| Column::new(id.clone(), title.clone()))
                .collect(),
        )
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|col| col.id == column_id)
    }

    /// Gets the column currently holding a card
    pub fn column_for_card(&self, card_id: &CardId) -> Option<&Column> {
        self.columns
            .iter()
            .find(|col| col.cards.iter().any(|card| &card.id == card_id))
    }

    pub fn card(&self, card_id: &CardId) -> Option<&Card> {
        self.columns
            .iter()
            .flat_map(|col| col.cards.iter())
            .find(|card| &card.id == card_id)
    }

    fn card_mut(&mut self, card_id: &CardId) -> Option<&mut Card> {
        self.columns
            .iter_mut()
            .flat_map(|col| col.cards.iter_mut())
            .find(|card| &card.id == card_id)
    }

    fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.id == column_id)
    }

    /// Moves a card from `source` to `dest` at `target_index`, clamped to the
    /// destination length. Within one column this is remove-then-insert.
    /// Returns false and leaves the board untouched if the card is not in
    /// `source` or `dest` does not exist.
    pub fn move_card(
        &mut self,
        card_id: &CardId,
        source: &str,
        dest: &str,
        target_index: usize,
    ) -> bool {
        let (Some(src_idx), Some(dest_idx)) = (self.column_index(source), self.column_index(dest))
        else {
            debug!("move of {} ignored: unknown column {} or {}", card_id, source, dest);
            return false;
        };
        let Some(card_pos) = self.columns[src_idx].position_of(card_id) else {
            debug!("move of {} ignored: not in column {}", card_id, source);
            return false;
        };

        let mut card = self.columns[src_idx].cards.remove(card_pos);
        card.status = self.columns[dest_idx].id.clone();

        let dest_cards = &mut self.columns[dest_idx].cards;
        let index = target_index.min(dest_cards.len());
        dest_cards.insert(index, card);

        self.touch();
        true
    }

    /// Resolves a drag-and-drop release. Dropping on a card takes that card's
    /// slot; dropping on a column sends the card to the end of it.
    pub fn drop_card(&mut self, active: &CardId, over: &DropTarget) -> bool {
        let Some(source) = self.column_for_card(active).map(|col| col.id.clone()) else {
            return false;
        };

        let (dest, target_index) = match over {
            DropTarget::Card(over_id) => {
                if over_id == active {
                    return false;
                }
                let Some(column) = self.column_for_card(over_id) else {
                    return false;
                };
                match column.position_of(over_id) {
                    Some(index) => (column.id.clone(), index),
                    None => return false,
                }
            }
            DropTarget::Column(column_id) => match self.column(column_id) {
                // Same-column drops land last once the card is taken out
                Some(column) if column.id == source => {
                    (column.id.clone(), column.cards.len().saturating_sub(1))
                }
                Some(column) => (column.id.clone(), column.cards.len()),
                None => return false,
            },
        };

        self.move_card(active, &source, &dest, target_index)
    }

    /// Flips a subtask's done flag
    pub fn toggle_subtask(&mut self, card_id: &CardId, subtask_id: &str) -> bool {
        let toggled = self
            .card_mut(card_id)
            .map(|card| card.toggle_subtask(subtask_id))
            .unwrap_or(false);
        if toggled {
            self.touch();
        } else {
            debug!("toggle of subtask {} on {} ignored", subtask_id, card_id);
        }
        toggled
    }

    /// Starts or stops a card's timer using the current time
    pub fn toggle_timer(&mut self, card_id: &CardId) -> bool {
        self.toggle_timer_at(card_id, Utc::now())
    }

    pub fn toggle_timer_at(&mut self, card_id: &CardId, now: DateTime<Utc>) -> bool {
        match self.card_mut(card_id) {
            Some(card) => {
                card.toggle_timer_at(now);
                self.touch();
                true
            }
            None => {
                debug!("timer toggle on {} ignored: no such card", card_id);
                false
            }
        }
    }

    /// Puts a card at the top of the column named by its status. Ignored if
    /// that column does not exist or the id is already on the board.
    pub fn create_card(&mut self, card: Card) -> bool {
        if self.card(&card.id).is_some() {
            debug!("card {} already exists", card.id);
            return false;
        }
        let Some(idx) = self.column_index(&card.status) else {
            debug!("card {} targets unknown column {}", card.id, card.status);
            return false;
        };

        self.columns[idx].cards.insert(0, card);
        self.touch();
        true
    }

    /// Appends an empty column. Returns its id, or `None` for a blank title.
    pub fn add_column(&mut self, title: &str) -> Option<String> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let base = match slugify(title) {
            slug if slug.is_empty() => {
                let uuid = Uuid::new_v4().simple().to_string();
                format!("column-{}", &uuid[..6])
            }
            slug => slug,
        };

        let id = if self.column(&base).is_none() {
            base
        } else {
            let mut n = self.columns.len() + 1;
            loop {
                let candidate = format!("{}-{}", base, n);
                if self.column(&candidate).is_none() {
                    break candidate;
                }
                n += 1;
            }
        };

        self.columns.push(Column::new(id.clone(), title));
        self.touch();
        Some(id)
    }

    /// Sorted distinct tags across every card
    pub fn tags(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|col| col.cards.iter())
            .flat_map(|card| card.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn stats(&self) -> BoardStats {
        BoardStats {
            total_columns: self.columns.len(),
            total_cards: self.columns.iter().map(|col| col.cards.len()).sum(),
        }
    }

    /// Realigns every card's status with the column holding it. Returns the
    /// number of cards that changed.
    pub fn realign_statuses(&mut self) -> usize {
        let mut fixed = 0;
        for column in &mut self.columns {
            for card in &mut column.cards {
                if card.status != column.id {
                    card.status = column.id.clone();
                    fixed += 1;
                }
            }
        }
        fixed
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::from_config(&KanbanConfig::default())
    }
}

/// Lowercases, turns whitespace runs into `-` and drops anything outside
/// `[a-z0-9-]`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_whitespace = false;
    for ch in title.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            slug.push(ch);
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::Subtask;
    use chrono::Duration;

    fn sample_board() -> (Board, Vec<CardId>) {
        let mut board = Board::default();
        let mut ids = Vec::new();
        for title in ["C", "B", "A"] {
            let card = Card::new(title, "backlog");
            ids.push(card.id.clone());
            assert!(board.create_card(card));
        }
        // create_card prepends, so display order is A, B, C
        ids.reverse();
        (board, ids)
    }

    fn titles(board: &Board, column: &str) -> Vec<String> {
        board
            .column(column)
            .unwrap()
            .cards
            .iter()
            .map(|c| c.title.clone())
            .collect()
    }

    #[test]
    fn test_board_creation() {
        let board = Board::default();
        let ids: Vec<&str> = board.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["backlog", "in-progress", "review", "done"]);
        assert_eq!(board.meta.version, 1);
        assert_eq!(board.stats().total_cards, 0);
    }

    #[test]
    fn test_create_card_prepends() {
        let (board, _) = sample_board();
        assert_eq!(titles(&board, "backlog"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_create_card_unknown_column() {
        let mut board = Board::default();
        let before = board.clone();
        assert!(!board.create_card(Card::new("Lost", "nowhere")));
        assert_eq!(board, before);
    }

    #[test]
    fn test_create_card_duplicate_id() {
        let (mut board, ids) = sample_board();
        let mut dup = Card::new("Dup", "done");
        dup.id = ids[0].clone();
        assert!(!board.create_card(dup));
        assert_eq!(board.stats().total_cards, 3);
    }

    #[test]
    fn test_move_card_between_columns() {
        let (mut board, ids) = sample_board();
        let moved = ids[1].clone();

        assert!(board.move_card(&moved, "backlog", "review", 0));

        assert_eq!(titles(&board, "backlog"), vec!["A", "C"]);
        assert_eq!(titles(&board, "review"), vec!["B"]);
        assert_eq!(board.card(&moved).unwrap().status, "review");
        let occurrences = board
            .columns
            .iter()
            .flat_map(|c| c.cards.iter())
            .filter(|c| c.id == moved)
            .count();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn test_move_card_clamps_target_index() {
        let (mut board, ids) = sample_board();
        assert!(board.move_card(&ids[0], "backlog", "done", 99));
        assert!(board.move_card(&ids[1], "backlog", "done", 99));
        assert_eq!(titles(&board, "done"), vec!["A", "B"]);
    }

    #[test]
    fn test_same_column_reorder_preserves_cards() {
        let (mut board, ids) = sample_board();

        assert!(board.move_card(&ids[0], "backlog", "backlog", 2));
        assert_eq!(titles(&board, "backlog"), vec!["B", "C", "A"]);

        assert!(board.move_card(&ids[2], "backlog", "backlog", 0));
        assert_eq!(titles(&board, "backlog"), vec!["C", "B", "A"]);

        let mut sorted = titles(&board, "backlog");
        sorted.sort();
        assert_eq!(sorted, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_move_card_wrong_source_is_noop() {
        let (mut board, ids) = sample_board();
        let before = board.clone();

        assert!(!board.move_card(&ids[0], "review", "done", 0));
        assert!(!board.move_card(&ids[0], "backlog", "missing", 0));
        assert!(!board.move_card(&CardId::generate(), "backlog", "done", 0));
        assert_eq!(board, before);
    }

    #[test]
    fn test_drop_on_card_in_other_column() {
        let (mut board, ids) = sample_board();
        board.move_card(&ids[2], "backlog", "review", 0);

        // Drop A onto C: A takes C's slot, C shifts down
        assert!(board.drop_card(&ids[0], &DropTarget::Card(ids[2].clone())));
        assert_eq!(titles(&board, "review"), vec!["A", "C"]);
        assert_eq!(board.card(&ids[0]).unwrap().status, "review");
    }

    #[test]
    fn test_drop_on_card_same_column() {
        let (mut board, ids) = sample_board();
        assert!(board.drop_card(&ids[2], &DropTarget::Card(ids[0].clone())));
        assert_eq!(titles(&board, "backlog"), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_drop_on_own_column_moves_to_end() {
        let (mut board, ids) = sample_board();
        assert!(board.drop_card(&ids[0], &DropTarget::Column("backlog".to_string())));
        assert_eq!(titles(&board, "backlog"), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_drop_on_other_column_appends() {
        let (mut board, ids) = sample_board();
        board.move_card(&ids[2], "backlog", "done", 0);
        assert!(board.drop_card(&ids[0], &DropTarget::Column("done".to_string())));
        assert_eq!(titles(&board, "done"), vec!["C", "A"]);
    }

    #[test]
    fn test_drop_noops() {
        let (mut board, ids) = sample_board();
        let before = board.clone();

        assert!(!board.drop_card(&ids[0], &DropTarget::Card(ids[0].clone())));
        assert!(!board.drop_card(&ids[0], &DropTarget::Column("missing".to_string())));
        assert!(!board.drop_card(&CardId::generate(), &DropTarget::Column("done".to_string())));
        assert_eq!(board, before);
    }

    #[test]
    fn test_toggle_subtask_on_board() {
        let mut board = Board::default();
        let mut card = Card::new("Card", "backlog");
        card.subtasks.push(Subtask::new("Step"));
        let subtask_id = card.subtasks[0].id.clone();
        let card_id = card.id.clone();
        board.create_card(card);

        assert!(board.toggle_subtask(&card_id, &subtask_id));
        assert!(board.card(&card_id).unwrap().subtasks[0].done);
        assert!(board.toggle_subtask(&card_id, &subtask_id));
        assert!(!board.card(&card_id).unwrap().subtasks[0].done);

        assert!(!board.toggle_subtask(&card_id, "subtask-nope"));
        assert!(!board.toggle_subtask(&CardId::generate(), &subtask_id));
    }

    #[test]
    fn test_toggle_timer_on_board() {
        let (mut board, ids) = sample_board();
        let start = Utc::now();

        assert!(board.toggle_timer_at(&ids[0], start));
        assert!(board.card(&ids[0]).unwrap().is_timer_running());

        assert!(board.toggle_timer_at(&ids[0], start + Duration::minutes(7)));
        let card = board.card(&ids[0]).unwrap();
        assert!(!card.is_timer_running());
        assert_eq!(card.time_tracked_minutes, 7);

        assert!(!board.toggle_timer(&CardId::generate()));
    }

    #[test]
    fn test_mutation_stamps_last_updated() {
        let (mut board, ids) = sample_board();
        let initial = board.last_updated;

        std::thread::sleep(std::time::Duration::from_millis(10));
        board.move_card(&ids[0], "backlog", "done", 0);

        assert!(board.last_updated > initial);
    }

    fn assert_stamps(board: &mut Board, mutate: impl FnOnce(&mut Board) -> bool) {
        let initial = board.last_updated;
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(mutate(board));
        assert!(board.last_updated > initial);
    }

    #[test]
    fn test_every_mutation_stamps_last_updated() {
        let mut board = Board::default();
        let mut card = Card::new("Card", "backlog");
        card.subtasks.push(Subtask::new("Step"));
        let card_id = card.id.clone();
        let subtask_id = card.subtasks[0].id.clone();

        assert_stamps(&mut board, |b| b.create_card(card));
        assert_stamps(&mut board, |b| b.add_column("Blocked").is_some());
        assert_stamps(&mut board, |b| b.toggle_subtask(&card_id, &subtask_id));
        assert_stamps(&mut board, |b| b.toggle_timer(&card_id));
        assert_stamps(&mut board, |b| b.toggle_timer(&card_id));
        assert_stamps(&mut board, |b| {
            b.drop_card(&card_id, &DropTarget::Column("blocked".to_string()))
        });
    }

    #[test]
    fn test_noop_does_not_stamp() {
        let (mut board, _) = sample_board();
        let initial = board.last_updated;

        std::thread::sleep(std::time::Duration::from_millis(10));
        board.toggle_timer(&CardId::generate());

        assert_eq!(board.last_updated, initial);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("In Progress"), "in-progress");
        assert_eq!(slugify("QA   & Review!"), "qa--review");
        assert_eq!(slugify("Déjà vu"), "dj-vu");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_add_column() {
        let mut board = Board::default();
        let id = board.add_column("  Blocked Items ").unwrap();
        assert_eq!(id, "blocked-items");

        let column = board.columns.last().unwrap();
        assert_eq!(column.title, "Blocked Items");
        assert!(column.cards.is_empty());
    }

    #[test]
    fn test_add_column_ignores_blank_title() {
        let mut board = Board::default();
        assert!(board.add_column("   ").is_none());
        assert_eq!(board.columns.len(), 4);
    }

    #[test]
    fn test_add_column_collision_suffixes_count() {
        let mut board = Board::default();
        // Four default columns, so the suffix is the new count: 5
        assert_eq!(board.add_column("Review").unwrap(), "review-5");
        assert_eq!(board.add_column("Review").unwrap(), "review-6");
    }

    #[test]
    fn test_add_column_collision_skips_taken_suffix() {
        let mut board = Board::new(vec![Column::new("todo", "Todo")]);
        assert_eq!(board.add_column("Todo 2").unwrap(), "todo-2");
        // Occupy the count suffix so the next one is used
        board.columns.push(Column::new("todo-4", "Todo 4"));
        assert_eq!(board.add_column("Todo").unwrap(), "todo-5");
    }

    #[test]
    fn test_add_column_fallback_id() {
        let mut board = Board::default();
        let id = board.add_column("!!!").unwrap();
        assert!(id.starts_with("column-"));
        assert_eq!(id.len(), "column-".len() + 6);
    }

    #[test]
    fn test_tags_and_stats() {
        let mut board = Board::default();
        let mut a = Card::new("A", "backlog");
        a.tags = vec!["ops".to_string(), "api".to_string()];
        let mut b = Card::new("B", "done");
        b.tags = vec!["ops".to_string(), "ui".to_string()];
        board.create_card(a);
        board.create_card(b);

        assert_eq!(board.tags(), vec!["api", "ops", "ui"]);
        assert_eq!(
            board.stats(),
            BoardStats {
                total_columns: 4,
                total_cards: 2
            }
        );
    }

    #[test]
    fn test_realign_statuses() {
        let (mut board, ids) = sample_board();
        board.columns[0].cards[1].status = "done".to_string();

        assert_eq!(board.realign_statuses(), 1);
        assert_eq!(board.card(&ids[1]).unwrap().status, "backlog");
        assert_eq!(board.realign_statuses(), 0);
    }

    #[test]
    fn test_board_serialization_shape() {
        let board = Board::default();
        let value = serde_json::to_value(&board).unwrap();
        assert!(value.get("lastUpdated").is_some());
        assert_eq!(value["meta"]["version"], 1);
        assert!(value["meta"].get("dashboards").is_none());
        assert_eq!(value["columns"][1]["id"], "in-progress");
    }
}
