use crate::domain::card::Card;
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Priority,
    Due,
    Tracked,
    Progress,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "priority" => Ok(SortField::Priority),
            "due" => Ok(SortField::Due),
            "tracked" => Ok(SortField::Tracked),
            "progress" => Ok(SortField::Progress),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: title, priority, due, tracked, progress",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts cards in place. The sort is stable, so equal cards keep their
/// board order.
///
/// # Examples
/// ```
/// use kanban_core::domain::card::{Card, Priority};
/// use kanban_core::domain::sorting::{sort_cards, SortField, SortOrder};
///
/// let mut low = Card::new("Low", "backlog");
/// low.priority = Priority::Low;
/// let mut critical = Card::new("Critical", "backlog");
/// critical.priority = Priority::Critical;
///
/// let mut cards = vec![&low, &critical];
/// sort_cards(&mut cards, SortField::Priority, SortOrder::Descending);
/// assert_eq!(cards[0].title, "Critical");
/// ```
pub fn sort_cards(cards: &mut [&Card], field: SortField, order: SortOrder) {
    cards.sort_by(|a, b| {
        let cmp = match field {
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Priority => a.priority.cmp(&b.priority),
            SortField::Due => compare_due_dates(a, b),
            SortField::Tracked => a.time_tracked_minutes.cmp(&b.time_tracked_minutes),
            SortField::Progress => compare_progress(a, b),
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Cards without a (parsable) due date always sort last
fn compare_due_dates(a: &Card, b: &Card) -> Ordering {
    match (a.due_at(), b.due_at()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Compare by fraction of subtasks done; cards without subtasks count as 0%
fn compare_progress(a: &Card, b: &Card) -> Ordering {
    fn ratio(card: &Card) -> f64 {
        match card.subtask_progress() {
            (_, 0) => 0.0,
            (done, total) => done as f64 / total as f64,
        }
    }

    ratio(a).partial_cmp(&ratio(b)).unwrap_or(Ordering::Equal)
}
