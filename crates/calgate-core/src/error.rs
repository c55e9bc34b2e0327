//! Error types for guarded calendar operations.
//!
//! Every guarded operation reports its outcome as an [`OperationResult`],
//! and every failure is one of the [`CalEventError`] kinds. UI layers map
//! these to user-facing messages; the core never retries on any of them.

use thiserror::Error;

/// The reason a guarded calendar operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CalEventError {
    /// The user (or the force-deny override) refused calendar access.
    #[error("access to the calendar store was denied")]
    AccessDenied,

    /// No calendar with the requested title exists.
    #[error("calendar not found")]
    CalendarNotFound,

    /// The store rejected an event write.
    #[error("failed to save event in calendar")]
    SaveFailed,

    /// A throwing guarded action returned an error.
    #[error("guarded action raised an error")]
    ThrownErrorCaught,

    /// The store reported an authorization state the gate does not handle,
    /// or an operation failed in a way that has no dedicated kind.
    #[error("unknown calendar error")]
    Unknown,

    /// Reserved for executor self-tests that exercise the failure path.
    /// Production code never reports it.
    #[error("expected failure")]
    ExpectedFailure,
}

impl CalEventError {
    /// Returns a stable snake_case identifier for this error.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessDenied => "access_denied",
            Self::CalendarNotFound => "calendar_not_found",
            Self::SaveFailed => "save_failed",
            Self::ThrownErrorCaught => "thrown_error_caught",
            Self::Unknown => "unknown",
            Self::ExpectedFailure => "expected_failure",
        }
    }

    /// Returns true if the failure came from the authorization gate rather
    /// than from the guarded action.
    pub fn is_gate_failure(&self) -> bool {
        matches!(self, Self::AccessDenied | Self::Unknown)
    }
}

/// The outcome of a guarded calendar operation.
pub type OperationResult<T> = Result<T, CalEventError>;
