//! Guarded execution.
//!
//! [`GuardedExecutor`] runs one unit of work only after the
//! [`AuthorizationGate`] succeeds, and funnels every outcome (gate failure,
//! action failure, action success) into one [`Completion`].
//!
//! The gate check is awaited to the end before the action is even built,
//! so an action never overlaps an unanswered permission prompt.

use std::future::Future;

use calgate_core::CalEventError;
use tracing::{debug, warn};

use crate::completion::Completion;
use crate::gate::AuthorizationGate;

/// Error type a throwing guarded action may return.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Runs actions behind the authorization gate.
#[derive(Debug)]
pub struct GuardedExecutor {
    gate: AuthorizationGate,
}

impl GuardedExecutor {
    /// Creates an executor guarded by `gate`.
    pub fn new(gate: AuthorizationGate) -> Self {
        Self { gate }
    }

    /// Returns the gate guarding this executor.
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    /// Runs `action` once the gate succeeds.
    ///
    /// On a gate failure the error goes to `completion` and `action` is never
    /// invoked. Otherwise `action` receives the completion and is
    /// responsible for reporting its own outcome.
    pub async fn execute<T, F, Fut>(&self, action: F, completion: Completion<T>)
    where
        F: FnOnce(Completion<T>) -> Fut,
        Fut: Future<Output = ()>,
    {
        if let Err(error) = self.gate.check().await {
            debug!(%error, "Gate refused guarded action");
            completion.fail(error);
            return;
        }
        action(completion).await;
    }

    /// Runs a fallible `action` once the gate succeeds.
    ///
    /// Gating is the same as [`execute`](Self::execute). If `action` returns
    /// an error, it is logged and reported as
    /// [`CalEventError::ThrownErrorCaught`], unless the action already
    /// reported a result.
    ///
    /// An `Ok(())` return is not a success report. An action that returns
    /// `Ok(())` without calling its completion leaves the operation
    /// unresolved and the handler is never invoked.
    pub async fn execute_and_throw<T, F, Fut>(&self, action: F, completion: Completion<T>)
    where
        F: FnOnce(Completion<T>) -> Fut,
        Fut: Future<Output = Result<(), ActionError>>,
    {
        if let Err(error) = self.gate.check().await {
            debug!(%error, "Gate refused guarded action");
            completion.fail(error);
            return;
        }
        if let Err(error) = action(completion.clone()).await {
            warn!(error = %error, "Guarded action raised an error");
            completion.fail(CalEventError::ThrownErrorCaught);
        }
    }
}
