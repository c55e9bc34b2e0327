//! Calendar and event handles.
//!
//! The host store owns calendars and events; this crate only carries
//! handles to them:
//! - [`CalendarRef`]: a calendar, identified by the store's opaque id
//! - [`EventRef`]: an event bound to its owning calendar
//! - [`EventDraft`]: an event that has not been bound to a calendar yet

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout used by [`EventRef::brief`].
const BRIEF_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// A handle to a calendar owned by the host store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarRef {
    /// Opaque store identifier.
    pub id: String,
    /// Human-readable calendar title.
    pub title: String,
}

impl CalendarRef {
    /// Creates a new calendar handle.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A handle to an event owned by the host store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRef {
    /// Opaque store identifier, `None` until the store has saved the event.
    pub id: Option<String>,
    /// Event title.
    pub title: String,
    /// Start time (inclusive).
    pub start: DateTime<Utc>,
    /// End time.
    pub end: DateTime<Utc>,
    /// The calendar the event belongs to.
    pub calendar: CalendarRef,
}

impl EventRef {
    /// Returns true if the store has assigned an id to this event.
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Returns the event's duration.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// One-line summary: title, start, end and owning calendar.
    pub fn brief(&self) -> String {
        format!(
            "{} {} to {} in {}",
            self.title,
            self.start.format(BRIEF_TIME_FORMAT),
            self.end.format(BRIEF_TIME_FORMAT),
            self.calendar.title
        )
    }
}

/// An event that has not been placed in a calendar yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Event title.
    pub title: String,
    /// Start time.
    pub start: DateTime<Utc>,
    /// End time.
    pub end: DateTime<Utc>,
}

impl EventDraft {
    /// Creates a draft with explicit start and end.
    ///
    /// # Panics
    ///
    /// Panics if `end` is before `start`.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "EventDraft start must be <= end");
        Self {
            title: title.into(),
            start,
            end,
        }
    }

    /// Creates a draft, or `None` if `end` is before `start`.
    pub fn try_new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then(|| Self {
            title: title.into(),
            start,
            end,
        })
    }

    /// Creates a draft starting at `start` and lasting `duration`.
    ///
    /// Returns `None` if `duration` is negative or the end is not
    /// representable.
    pub fn starting_at(
        title: impl Into<String>,
        start: DateTime<Utc>,
        duration: Duration,
    ) -> Option<Self> {
        let end = start.checked_add_signed(duration)?;
        Self::try_new(title, start, end)
    }

    /// Binds the draft to `calendar`, producing an unsaved event.
    pub fn into_event(self, calendar: CalendarRef) -> EventRef {
        EventRef {
            id: None,
            title: self.title,
            start: self.start,
            end: self.end,
            calendar,
        }
    }
}
