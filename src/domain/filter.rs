use crate::domain::board::{Board, Column};
use crate::domain::card::{Assignee, Card, Priority};

/// Exact-match filters; `None` means "all"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub tag: Option<String>,
    pub priority: Option<Priority>,
    pub assignee: Option<Assignee>,
}

impl Filters {
    /// True when any filter narrows the board
    pub fn is_active(&self) -> bool {
        self.tag.is_some() || self.priority.is_some() || self.assignee.is_some()
    }

    pub fn matches(&self, card: &Card) -> bool {
        let priority_ok = self.priority.map_or(true, |p| card.priority == p);
        let tag_ok = self
            .tag
            .as_ref()
            .map_or(true, |tag| card.tags.iter().any(|t| t == tag));
        let assignee_ok = self.assignee.map_or(true, |a| card.assignee == a);

        priority_ok && tag_ok && assignee_ok
    }
}

/// A column with only the cards that passed filtering
#[derive(Debug, Clone)]
pub struct FilteredColumn<'a> {
    pub column: &'a Column,
    pub cards: Vec<&'a Card>,
}

/// Derives the visible cards per column without touching the board.
///
/// The search term is trimmed and matched case-insensitively against the
/// card's title, description, assignee, priority, tags and subtask titles.
/// A blank term matches everything. Search and filters are AND-combined.
pub fn filter_cards<'a>(
    board: &'a Board,
    filters: &Filters,
    search_term: &str,
) -> Vec<FilteredColumn<'a>> {
    let needle = search_term.trim().to_lowercase();

    board
        .columns
        .iter()
        .map(|column| FilteredColumn {
            column,
            cards: column
                .cards
                .iter()
                .filter(|card| {
                    let search_ok = needle.is_empty() || card.search_haystack().contains(&needle);
                    search_ok && filters.matches(card)
                })
                .collect(),
        })
        .collect()
}

impl Board {
    /// See [`filter_cards`]
    pub fn filter_cards(&self, filters: &Filters, search_term: &str) -> Vec<FilteredColumn<'_>> {
        filter_cards(self, filters, search_term)
    }
}
