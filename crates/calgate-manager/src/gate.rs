//! Authorization gate.
//!
//! [`AuthorizationGate::check`] answers "may a guarded action run now?" by
//! reading the store's authorization state and, when the user has not been
//! asked yet, showing the permission prompt once. The gate never loops or
//! retries; calling it again later is the caller's decision.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use calgate_core::{AuthorizationState, CalEventError, OperationResult};
use calgate_store::CalendarStore;
use tracing::{debug, info, warn};

/// Checks calendar access before guarded actions run.
pub struct AuthorizationGate {
    store: Arc<dyn CalendarStore>,
    denied_for_testing: AtomicBool,
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("store", &self.store.name())
            .field("denied_for_testing", &self.denied_for_testing())
            .finish()
    }
}

impl AuthorizationGate {
    /// Creates a gate over `store`.
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self {
            store,
            denied_for_testing: AtomicBool::new(false),
        }
    }

    /// Forces every check to fail with [`CalEventError::AccessDenied`],
    /// without consulting the store, while `denied` is set.
    pub fn set_denied_for_testing(&self, denied: bool) {
        self.denied_for_testing.store(denied, Ordering::SeqCst);
    }

    /// Returns true while the force-deny override is set.
    pub fn denied_for_testing(&self) -> bool {
        self.denied_for_testing.load(Ordering::SeqCst)
    }

    /// Resolves whether access is granted.
    ///
    /// | store state     | outcome                                   |
    /// |-----------------|-------------------------------------------|
    /// | `Authorized`    | `Ok(())`                                  |
    /// | `Denied`        | `AccessDenied`                            |
    /// | `NotDetermined` | one prompt; granted → `Ok(())`, otherwise `AccessDenied` |
    /// | anything else   | `Unknown`                                 |
    pub async fn check(&self) -> OperationResult<()> {
        if self.denied_for_testing() {
            debug!("Authorization forced to denied");
            return Err(CalEventError::AccessDenied);
        }

        let state = self.store.authorization_state();
        debug!(store = self.store.name(), %state, "Checking calendar authorization");

        match state {
            AuthorizationState::Authorized => Ok(()),
            AuthorizationState::Denied => {
                warn!("Calendar access denied");
                Err(CalEventError::AccessDenied)
            }
            AuthorizationState::NotDetermined => self.prompt().await,
            AuthorizationState::Restricted | AuthorizationState::Unknown => {
                warn!(%state, "Unsupported authorization state");
                Err(CalEventError::Unknown)
            }
        }
    }

    async fn prompt(&self) -> OperationResult<()> {
        match self.store.request_access().await {
            Ok(true) => {
                info!(store = self.store.name(), "Calendar access granted");
                Ok(())
            }
            Ok(false) => {
                warn!(store = self.store.name(), "Calendar access refused at prompt");
                Err(CalEventError::AccessDenied)
            }
            Err(e) => {
                warn!(error = %e, "Permission prompt failed");
                Err(CalEventError::AccessDenied)
            }
        }
    }
}
