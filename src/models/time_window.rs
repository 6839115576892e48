//! The campaign time window used to bound every order query.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the upper bound of the query range is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Queries always cover the configured campaign period.
    #[default]
    Fixed,
    /// Queries cover the period from the campaign start up to "now".
    SinceStart,
}

/// Errors raised when constructing a [`TimeWindow`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeWindowError {
    /// The start instant is not strictly before the end instant.
    #[error("Campaign start {start} must be before campaign end {end}")]
    NotOrdered {
        /// Campaign start rendered as RFC 3339.
        start: String,
        /// Campaign end rendered as RFC 3339.
        end: String,
    },
}

/// An immutable `(start, end)` pair of UTC instants.
///
/// The window is derived once when the application starts and never slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    mode: WindowMode,
}

/// The concrete `(start, end]` range sent to the upstream for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRange {
    /// Exclusive lower bound.
    pub start: DateTime<Utc>,
    /// Inclusive upper bound.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window, rejecting ranges where `start >= end`.
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        mode: WindowMode,
    ) -> Result<Self, TimeWindowError> {
        if start >= end {
            return Err(TimeWindowError::NotOrdered {
                start: to_iso(&start),
                end: to_iso(&end),
            });
        }
        Ok(Self { start, end, mode })
    }

    /// Campaign start in UTC.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Campaign end in UTC.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// The configured window mode.
    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    /// Resolves the range to query at instant `now`.
    pub fn resolve(&self, now: DateTime<Utc>) -> QueryRange {
        match self.mode {
            WindowMode::Fixed => QueryRange { start: self.start, end: self.end },
            WindowMode::SinceStart => QueryRange { start: self.start, end: now },
        }
    }
}

impl QueryRange {
    /// Lower bound in the upstream's ISO 8601 form.
    pub fn start_iso(&self) -> String {
        to_iso(&self.start)
    }

    /// Upper bound in the upstream's ISO 8601 form.
    pub fn end_iso(&self) -> String {
        to_iso(&self.end)
    }
}

/// Renders an instant as `YYYY-MM-DDTHH:MM:SS+00:00`.
pub fn to_iso(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}
