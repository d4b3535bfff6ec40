//! Time tracking and due-date countdown helpers.
//!
//! Everything here is a pure function of its inputs; callers pass the
//! current time explicitly.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MINUTES_PER_HOUR: u64 = 60;
const MINUTES_PER_DAY: u64 = 24 * MINUTES_PER_HOUR;
const MILLIS_PER_MINUTE: i64 = 60_000;

/// Urgency of a due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Overdue,
    Soon,
    Normal,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overdue => write!(f, "overdue"),
            Self::Soon => write!(f, "soon"),
            Self::Normal => write!(f, "normal"),
        }
    }
}

/// Display label and tone for a due date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub label: String,
    pub tone: Tone,
}

/// Formats a minute count as `Xh Ym`, `Xh` or `Ym`
pub fn format_minutes(minutes: u64) -> String {
    let hours = minutes / MINUTES_PER_HOUR;
    let mins = minutes % MINUTES_PER_HOUR;

    match (hours, mins) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Parses RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD`. Values without
/// an offset are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Short `Mon D` label. Unparsable input is returned unchanged.
pub fn format_date(value: Option<&str>) -> String {
    match value {
        None | Some("") => String::new(),
        Some(raw) => match parse_timestamp(raw) {
            Some(date) => date.format("%b %-d").to_string(),
            None => raw.to_string(),
        },
    }
}

/// Whole minutes from `from` to `to`, rounded towards negative infinity
fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().div_euclid(MILLIS_PER_MINUTE)
}

/// Elapsed whole minutes of a running timer, never negative
pub fn elapsed_minutes(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    minutes_between(started_at, now).max(0) as u64
}

/// Tracked total plus the running timer's elapsed minutes
pub fn running_minutes(
    tracked_minutes: u64,
    started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> u64 {
    match started_at {
        Some(start) => tracked_minutes.saturating_add(elapsed_minutes(start, now)),
        None => tracked_minutes,
    }
}

/// Countdown label and tone for a due date, or `None` if it does not parse
pub fn countdown(due: &str, now: DateTime<Utc>) -> Option<Countdown> {
    let target = parse_timestamp(due)?;
    let delta = minutes_between(now, target);
    let is_overdue = delta < 0;
    let abs = delta.unsigned_abs();

    let days = abs / MINUTES_PER_DAY;
    let hours = (abs % MINUTES_PER_DAY) / MINUTES_PER_HOUR;
    let minutes = abs % MINUTES_PER_HOUR;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 || days > 0 {
        parts.push(format!("{}h", hours));
    }
    if days == 0 {
        parts.push(format!("{}m", minutes));
    }
    let parts = parts.join(" ");

    let (label, tone) = if is_overdue {
        (format!("Overdue by {}", parts), Tone::Overdue)
    } else if delta <= MINUTES_PER_DAY as i64 {
        (format!("{} left", parts), Tone::Soon)
    } else {
        (format!("{} left", parts), Tone::Normal)
    };

    Some(Countdown { label, tone })
}
