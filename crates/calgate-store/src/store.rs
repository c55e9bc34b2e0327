//! CalendarStore trait definition.
//!
//! This module defines the [`CalendarStore`] trait, the seam between the
//! calgate core and the host platform's calendar subsystem. The host owns
//! authorization state, calendars and events; the core only asks.

use std::future::Future;
use std::pin::Pin;

use calgate_core::{AuthorizationState, CalendarRef, EventRef, TimeWindow};

use crate::error::StoreResult;

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so the manager can hold an
/// `Arc<dyn CalendarStore>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The host calendar subsystem, as seen by the core.
///
/// # Implementation Notes
///
/// - Implementations must be `Send + Sync`; one store is shared by every
///   concurrent operation.
/// - The store serializes its own authorization state; the core performs
///   no locking around these calls.
/// - `request_access` shows exactly one prompt per call. The core never calls
///   it unless `authorization_state` reported `NotDetermined`.
pub trait CalendarStore: Send + Sync {
    /// Returns the name of this store (e.g. "memory", "eventkit").
    fn name(&self) -> &str;

    /// Returns the current authorization state. Must be cheap.
    fn authorization_state(&self) -> AuthorizationState;

    /// Prompts the user for calendar access.
    ///
    /// Resolves to `true` if the user granted access. An error means the
    /// prompt itself could not be shown.
    fn request_access(&self) -> BoxFuture<'_, StoreResult<bool>>;

    /// Lists all event calendars.
    fn calendars(&self) -> BoxFuture<'_, StoreResult<Vec<CalendarRef>>>;

    /// Lists the events of `calendar` that overlap `window`.
    ///
    /// Ordering is store-defined.
    fn events(
        &self,
        calendar: CalendarRef,
        window: TimeWindow,
    ) -> BoxFuture<'_, StoreResult<Vec<EventRef>>>;

    /// Saves `event` into its calendar and returns the stored event, with
    /// the id the store assigned.
    fn save_event(&self, event: EventRef) -> BoxFuture<'_, StoreResult<EventRef>>;
}
