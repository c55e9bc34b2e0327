//! Core types: authorization state, calendar handles, time windows, errors

pub mod auth;
pub mod error;
pub mod event;
pub mod time;
pub mod tracing;

pub use auth::AuthorizationState;
pub use error::{CalEventError, OperationResult};
pub use event::{CalendarRef, EventDraft, EventRef};
pub use time::TimeWindow;
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
