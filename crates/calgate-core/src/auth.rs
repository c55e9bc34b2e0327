//! Authorization state of the host calendar store.

use std::fmt;

/// Authorization state reported by the host calendar store.
///
/// Queried fresh on every gate check, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationState {
    /// The user granted calendar access.
    Authorized,
    /// The user refused calendar access.
    Denied,
    /// The user has not been asked yet.
    NotDetermined,
    /// Access is blocked by a device policy the user cannot change.
    Restricted,
    /// The host reported a state this crate does not recognize.
    Unknown,
}

impl AuthorizationState {
    /// Returns the platform-style name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorized => "authorized",
            Self::Denied => "denied",
            Self::NotDetermined => "notDetermined",
            Self::Restricted => "restricted",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AuthorizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
