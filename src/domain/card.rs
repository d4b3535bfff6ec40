use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::time;

/// Unique identifier for a card (e.g., card-4f6c...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(String);

impl CardId {
    const PREFIX: &'static str = "card-";

    /// Generates a fresh random card id
    pub fn generate() -> Self {
        Self(format!("{}{}", Self::PREFIX, Uuid::new_v4()))
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CardId {
    type Err = crate::error::KanbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(crate::error::KanbanError::InvalidCardId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Card priority, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!(
                "Invalid priority '{}'. Valid priorities: low, medium, high, critical",
                s
            )),
        }
    }
}

/// Who a card is assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Assignee {
    Bumble,
    Optimus,
    Jason,
}

impl Assignee {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bumble => "Bumble",
            Self::Optimus => "Optimus",
            Self::Jason => "Jason",
        }
    }
}

impl fmt::Display for Assignee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Assignee {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bumble" => Ok(Self::Bumble),
            "optimus" => Ok(Self::Optimus),
            "jason" => Ok(Self::Jason),
            _ => Err(format!(
                "Invalid assignee '{}'. Valid assignees: Bumble, Optimus, Jason",
                s
            )),
        }
    }
}

/// A checklist item within a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub done: bool,
}

impl Subtask {
    const PREFIX: &'static str = "subtask-";

    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: format!("{}{}", Self::PREFIX, Uuid::new_v4()),
            title: title.into(),
            done: false,
        }
    }

    pub fn toggle(&mut self) {
        self.done = !self.done;
    }
}

/// Running-timer state of a card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTracking {
    pub is_running: bool,
    /// Unreadable stored values load as `None`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub started_at: Option<DateTime<Utc>>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(time::parse_timestamp))
}

impl TimeTracking {
    pub fn stopped() -> Self {
        Self::default()
    }

    pub fn running_since(started_at: DateTime<Utc>) -> Self {
        Self {
            is_running: true,
            started_at: Some(started_at),
        }
    }
}

/// A kanban card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Id of the column holding this card
    pub status: String,
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Raw date or date-time text as entered; see [`time::parse_timestamp`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub time_tracked_minutes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_tracking: Option<TimeTracking>,
    pub assignee: Assignee,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Card {
    /// Creates a card with a generated id, `medium` priority and no subtasks
    pub fn new(title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: CardId::generate(),
            title: title.into(),
            description: String::new(),
            status: status.into(),
            priority: Priority::Medium,
            tags: Vec::new(),
            due_date: None,
            time_tracked_minutes: 0,
            time_tracking: Some(TimeTracking::stopped()),
            assignee: Assignee::Bumble,
            subtasks: Vec::new(),
            link: None,
        }
    }

    pub fn is_timer_running(&self) -> bool {
        self.time_tracking
            .as_ref()
            .map(|t| t.is_running)
            .unwrap_or(false)
    }

    /// Flips the done flag of a subtask. Returns false if no such subtask exists.
    pub fn toggle_subtask(&mut self, subtask_id: &str) -> bool {
        match self.subtasks.iter_mut().find(|s| s.id == subtask_id) {
            Some(subtask) => {
                subtask.toggle();
                true
            }
            None => false,
        }
    }

    /// Starts a stopped timer, or stops a running one and banks the elapsed
    /// whole minutes.
    pub fn toggle_timer_at(&mut self, now: DateTime<Utc>) {
        if self.is_timer_running() {
            let started_at = self
                .time_tracking
                .as_ref()
                .and_then(|t| t.started_at)
                .unwrap_or(now);
            self.time_tracked_minutes = self
                .time_tracked_minutes
                .saturating_add(time::elapsed_minutes(started_at, now));
            self.time_tracking = Some(TimeTracking::stopped());
        } else {
            self.time_tracking = Some(TimeTracking::running_since(now));
        }
    }

    /// Tracked minutes including the running timer, if any
    pub fn total_minutes_at(&self, now: DateTime<Utc>) -> u64 {
        let started_at = self
            .time_tracking
            .as_ref()
            .filter(|t| t.is_running)
            .and_then(|t| t.started_at);
        time::running_minutes(self.time_tracked_minutes, started_at, now)
    }

    /// Completed and total subtask counts
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.done).count();
        (done, self.subtasks.len())
    }

    /// Parsed due date, if present and well-formed
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_date.as_deref().and_then(time::parse_timestamp)
    }

    /// Text searched by free-text filtering
    pub(crate) fn search_haystack(&self) -> String {
        let mut parts: Vec<&str> = vec![
            self.title.as_str(),
            self.description.as_str(),
            self.assignee.as_str(),
            self.priority.as_str(),
        ];
        let tags = self.tags.join(" ");
        parts.push(tags.as_str());
        parts.extend(self.subtasks.iter().map(|s| s.title.as_str()));
        parts.join(" ").to_lowercase()
    }
}

/// Form-style input for a new card
#[derive(Debug, Clone)]
pub struct CardDraft {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: Priority,
    /// Comma-separated tag list
    pub tags: String,
    pub assignee: Assignee,
    pub due_date: Option<String>,
    pub time_tracked_minutes: i64,
    pub subtasks: Vec<String>,
    pub link: Option<String>,
}

impl CardDraft {
    const DEFAULT_SUBTASK: &'static str = "Kickoff";
    const DEFAULT_TRACKED_MINUTES: i64 = 30;

    pub fn new(title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: status.into(),
            priority: Priority::High,
            tags: String::new(),
            assignee: Assignee::Bumble,
            due_date: None,
            time_tracked_minutes: Self::DEFAULT_TRACKED_MINUTES,
            subtasks: Vec::new(),
            link: None,
        }
    }

    /// Builds the card, or `None` when the title is blank
    pub fn build(self) -> Option<Card> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }

        let mut subtasks: Vec<Subtask> = self
            .subtasks
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(Subtask::new)
            .collect();
        if subtasks.is_empty() {
            subtasks.push(Subtask::new(Self::DEFAULT_SUBTASK));
        }

        Some(Card {
            id: CardId::generate(),
            title: title.to_string(),
            description: self.description.trim().to_string(),
            status: self.status,
            priority: self.priority,
            tags: parse_tags(&self.tags),
            due_date: self
                .due_date
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            time_tracked_minutes: self.time_tracked_minutes.max(0) as u64,
            time_tracking: Some(TimeTracking::stopped()),
            assignee: self.assignee,
            subtasks,
            link: self
                .link
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        })
    }
}

/// Splits a comma-separated tag list, dropping blanks and duplicates
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
