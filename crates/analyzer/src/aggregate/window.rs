//! Time window filter.
//!
//! The window is half-open, `[from, to)`; either side may be absent.
//! Records whose timestamp is unknown are never filtered.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use thiserror::Error;

use crate::parser::timestamp;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("Invalid time bound `{0}`: expected RFC 3339, `YYYY-MM-DD[ HH:MM:SS]` or `<n>m|h|d|w`")]
    InvalidBound(String),

    #[error("Empty time window: from {from} is not before to {to}")]
    Inverted {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn new(
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Self, WindowError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from >= to {
                return Err(WindowError::Inverted { from, to });
            }
        }
        Ok(Self { from, to })
    }

    /// Parse both bounds; relative bounds resolve against `now`.
    pub fn parse(
        from: Option<&str>,
        to: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, WindowError> {
        let from = from.map(|text| parse_bound(text, now)).transpose()?;
        let to = to.map(|text| parse_bound(text, now)).transpose()?;
        Self::new(from, to)
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn from(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    pub fn to(&self) -> Option<DateTime<Utc>> {
        self.to
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| ts >= from) && self.to.map_or(true, |to| ts < to)
    }

    /// `None` timestamps are admitted.
    pub fn admits(&self, ts: Option<DateTime<Utc>>) -> bool {
        ts.map_or(true, |ts| self.contains(ts))
    }
}

/// Absolute (`2026-01-17T10:00:00Z`, `2026-01-17 10:00:00`, `2026-01-17`)
/// or relative to `now` (`30m`, `24h`, `7d`, `2w`).
pub fn parse_bound(text: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, WindowError> {
    let text = text.trim();
    relative(text, now)
        .or_else(|| timestamp::parse_iso(text))
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
        .ok_or_else(|| WindowError::InvalidBound(text.to_string()))
}

fn relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let unit = text.chars().last()?;
    let amount: i64 = text[..text.len() - unit.len_utf8()]
        .trim()
        .parse::<u32>()
        .ok()?
        .into();

    let delta = match unit {
        'm' => TimeDelta::try_minutes(amount)?,
        'h' => TimeDelta::try_hours(amount)?,
        'd' => TimeDelta::try_days(amount)?,
        'w' => TimeDelta::try_weeks(amount)?,
        _ => return None,
    };
    now.checked_sub_signed(delta)
}
