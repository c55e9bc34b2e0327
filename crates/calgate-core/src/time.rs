//! Time windows for event queries.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A time window for querying calendar events.
///
/// Represents a half-open interval `[start, end)` in UTC.
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
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a new time window, or `None` if `start` is after `end`.
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Creates a time window from a start time and duration.
    ///
    /// Returns `None` if `duration` is negative or the end falls outside the
    /// representable range.
    pub fn from_duration(start: DateTime<Utc>, duration: Duration) -> Option<Self> {
        let end = start.checked_add_signed(duration)?;
        Self::try_new(start, end)
    }

    /// Creates a window from midnight UTC of `first` to midnight UTC of `last`.
    ///
    /// Returns `None` if `last` is before `first`.
    pub fn between_dates(first: NaiveDate, last: NaiveDate) -> Option<Self> {
        Self::try_new(
            first.and_time(NaiveTime::MIN).and_utc(),
            last.and_time(NaiveTime::MIN).and_utc(),
        )
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks if an event with the given start and end overlaps this window.
    ///
    /// An event overlaps if it starts before the window ends and ends after
    /// the window starts. Zero-length events overlap when their start falls
    /// inside the window.
    pub fn overlaps(&self, event_start: DateTime<Utc>, event_end: DateTime<Utc>) -> bool {
        if event_start == event_end {
            return self.contains(event_start);
        }
        event_start < self.end && event_end > self.start
    }
}
