//! Manager configuration.
//!
//! Settings can be built in code or read from a TOML file:
//!
//! ```toml
//! [events]
//! window_start = "2019-01-01"
//! window_end = "2019-12-31"
//! default_duration_minutes = 120
//! ```
//!
//! Missing keys fall back to the defaults.

use std::path::{Path, PathBuf};

use calgate_core::TimeWindow;
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_WINDOW_START: NaiveDate = date(2019, 1, 1);
const DEFAULT_WINDOW_END: NaiveDate = date(2019, 12, 31);
const DEFAULT_DURATION_MINUTES: i64 = 120;

/// Longest default event duration accepted: 366 days.
pub const MAX_EVENT_DURATION_MINUTES: i64 = 366 * 24 * 60;

const fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid default date"),
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values parsed but do not make sense together.
    #[error("invalid config: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Settings for [`CalendarManager`](crate::CalendarManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Window used by `list_events` when none is given.
    pub event_window: TimeWindow,
    /// Length of events created from a bare title.
    pub default_event_duration: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            event_window: TimeWindow {
                start: DEFAULT_WINDOW_START.and_time(NaiveTime::MIN).and_utc(),
                end: DEFAULT_WINDOW_END.and_time(NaiveTime::MIN).and_utc(),
            },
            default_event_duration: Duration::minutes(DEFAULT_DURATION_MINUTES),
        }
    }
}

impl ManagerConfig {
    /// Builder: set the default event query window.
    pub fn with_event_window(mut self, window: TimeWindow) -> Self {
        self.event_window = window;
        self
    }

    /// Builder: set the duration of events created from a title.
    ///
    /// The value is clamped to between one minute and
    /// [`MAX_EVENT_DURATION_MINUTES`].
    pub fn with_default_event_duration(mut self, duration: Duration) -> Self {
        self.default_event_duration =
            duration.clamp(Duration::minutes(1), Duration::minutes(MAX_EVENT_DURATION_MINUTES));
        self
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        file.into_config()
    }

    /// Loads configuration from a TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// On-disk layout of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    events: EventSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EventSettings {
    window_start: NaiveDate,
    window_end: NaiveDate,
    default_duration_minutes: i64,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            window_start: DEFAULT_WINDOW_START,
            window_end: DEFAULT_WINDOW_END,
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }
}

impl ConfigFile {
    fn into_config(self) -> Result<ManagerConfig, ConfigError> {
        let events = self.events;
        let event_window = TimeWindow::between_dates(events.window_start, events.window_end)
            .ok_or_else(|| {
                ConfigError::invalid(format!(
                    "events.window_end ({}) is before events.window_start ({})",
                    events.window_end, events.window_start
                ))
            })?;

        if !(1..=MAX_EVENT_DURATION_MINUTES).contains(&events.default_duration_minutes) {
            return Err(ConfigError::invalid(format!(
                "events.default_duration_minutes must be between 1 and {MAX_EVENT_DURATION_MINUTES}, got {}",
                events.default_duration_minutes
            )));
        }
        let default_event_duration = Duration::minutes(events.default_duration_minutes);

        Ok(ManagerConfig {
            event_window,
            default_event_duration,
        })
    }
}
