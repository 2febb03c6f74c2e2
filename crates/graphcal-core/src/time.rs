//! Time window for calendar-view queries.
//!
//! Graph's `calendarView` endpoint requires an explicit `[start, end)` range
//! given as ISO 8601 timestamps. [`TimeWindow`] holds that range in UTC and
//! renders it the way the endpoint expects.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while building a time window.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    /// A timestamp could not be parsed as RFC 3339.
    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// The window ends before it starts.
    #[error("time window start {start} is after end {end}")]
    Inverted { start: String, end: String },
}

/// A half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::Inverted`] if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimeError> {
        if start > end {
            return Err(TimeError::Inverted {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parses a window from two RFC 3339 timestamps.
    ///
    /// Offsets are honoured and normalised to UTC, so
    /// `2021-07-01T09:00:00+09:00` and `2021-07-01T00:00:00Z` are equal.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeError> {
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }

    /// Returns the `startDateTime`/`endDateTime` query parameters.
    pub fn query_params(&self) -> [(&'static str, String); 2] {
        [
            ("startDateTime", format_timestamp(self.start)),
            ("endDateTime", format_timestamp(self.end)),
        ]
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TimeError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TimeError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
