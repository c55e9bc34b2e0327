//! In-memory calendar store.
//!
//! [`MemoryStore`] keeps calendars and events in process memory and scripts
//! the permission prompt. Hosts use it to run the core without a platform
//! calendar subsystem; tests use its counters and call log to observe what
//! the core asked for.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use calgate_core::{AuthorizationState, CalendarRef, EventRef, TimeWindow};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::{BoxFuture, CalendarStore};

const STORE_NAME: &str = "memory";

/// How the scripted permission prompt answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptAnswer {
    /// The user grants access.
    #[default]
    Grant,
    /// The user refuses or dismisses the prompt.
    Deny,
    /// The prompt cannot be shown.
    Fail,
}

/// A store call, as recorded in [`MemoryStore::calls`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `authorization_state` was queried.
    QueryState,
    /// `request_access` started.
    PromptShown,
    /// `request_access` finished with the given answer.
    PromptAnswered(PromptAnswer),
    /// `calendars` was called.
    ListCalendars,
    /// `events` was called for the calendar with this id.
    ListEvents(String),
    /// `save_event` was called with an event for the calendar with this id.
    SaveEvent(String),
}

/// A calendar store held entirely in memory.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<AuthorizationState>,
    calendars: Mutex<Vec<CalendarRef>>,
    events: Mutex<Vec<EventRef>>,
    saved: Mutex<Vec<EventRef>>,
    prompt_answer: PromptAnswer,
    prompt_delay: Option<Duration>,
    reject_saves: AtomicBool,
    unavailable_calendars: AtomicBool,
    unavailable_events: AtomicBool,
    prompts: AtomicUsize,
    fetches: AtomicUsize,
    saves: AtomicUsize,
    next_id: AtomicU64,
    calls: Mutex<Vec<StoreCall>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    /// Creates an empty, already authorized store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AuthorizationState::Authorized),
            calendars: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
            prompt_answer: PromptAnswer::default(),
            prompt_delay: None,
            reject_saves: AtomicBool::new(false),
            unavailable_calendars: AtomicBool::new(false),
            unavailable_events: AtomicBool::new(false),
            prompts: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Builder: set the initial authorization state.
    pub fn with_state(self, state: AuthorizationState) -> Self {
        *lock(&self.state) = state;
        self
    }

    /// Builder: add a calendar.
    pub fn with_calendar(self, calendar: CalendarRef) -> Self {
        lock(&self.calendars).push(calendar);
        self
    }

    /// Builder: add an existing event.
    pub fn with_event(self, event: EventRef) -> Self {
        lock(&self.events).push(event);
        self
    }

    /// Builder: set how the permission prompt answers.
    pub fn with_prompt_answer(mut self, answer: PromptAnswer) -> Self {
        self.prompt_answer = answer;
        self
    }

    /// Builder: make the permission prompt take `delay` to answer.
    pub fn with_prompt_delay(mut self, delay: Duration) -> Self {
        self.prompt_delay = Some(delay);
        self
    }

    /// Builder: reject every save.
    pub fn with_rejected_saves(self, reject: bool) -> Self {
        self.reject_saves.store(reject, Ordering::SeqCst);
        self
    }

    /// Builder: fail every calendar listing as unavailable.
    pub fn with_unavailable_calendars(self, unavailable: bool) -> Self {
        self.unavailable_calendars.store(unavailable, Ordering::SeqCst);
        self
    }

    /// Builder: fail every event listing as unavailable.
    pub fn with_unavailable_events(self, unavailable: bool) -> Self {
        self.unavailable_events.store(unavailable, Ordering::SeqCst);
        self
    }

    /// Changes the authorization state, as a user would in the settings app.
    pub fn set_state(&self, state: AuthorizationState) {
        *lock(&self.state) = state;
    }

    /// Number of permission prompts shown.
    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    /// Number of calendar and event listings served.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `save_event` calls received, successful or not.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Events saved through [`CalendarStore::save_event`], in save order.
    pub fn saved_events(&self) -> Vec<EventRef> {
        lock(&self.saved).clone()
    }

    /// Every call the store received, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: StoreCall) {
        lock(&self.calls).push(call);
    }

    fn check_available(flag: &AtomicBool) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("calendar database is unavailable")
                .with_store(STORE_NAME));
        }
        Ok(())
    }

    fn has_calendar(&self, id: &str) -> bool {
        lock(&self.calendars).iter().any(|calendar| calendar.id == id)
    }
}

impl CalendarStore for MemoryStore {
    fn name(&self) -> &str {
        STORE_NAME
    }

    fn authorization_state(&self) -> AuthorizationState {
        self.record(StoreCall::QueryState);
        *lock(&self.state)
    }

    fn request_access(&self) -> BoxFuture<'_, StoreResult<bool>> {
        Box::pin(async move {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            self.record(StoreCall::PromptShown);

            if let Some(delay) = self.prompt_delay {
                tokio::time::sleep(delay).await;
            }

            let answer = self.prompt_answer;
            self.record(StoreCall::PromptAnswered(answer));
            debug!(?answer, "Permission prompt answered");

            match answer {
                PromptAnswer::Grant => {
                    self.set_state(AuthorizationState::Authorized);
                    Ok(true)
                }
                PromptAnswer::Deny => {
                    self.set_state(AuthorizationState::Denied);
                    Ok(false)
                }
                PromptAnswer::Fail => Err(StoreError::unavailable(
                    "permission prompt could not be shown",
                )
                .with_store(STORE_NAME)),
            }
        })
    }

    fn calendars(&self) -> BoxFuture<'_, StoreResult<Vec<CalendarRef>>> {
        Box::pin(async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.record(StoreCall::ListCalendars);
            Self::check_available(&self.unavailable_calendars)?;
            Ok(lock(&self.calendars).clone())
        })
    }

    fn events(
        &self,
        calendar: CalendarRef,
        window: TimeWindow,
    ) -> BoxFuture<'_, StoreResult<Vec<EventRef>>> {
        Box::pin(async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.record(StoreCall::ListEvents(calendar.id.clone()));
            Self::check_available(&self.unavailable_events)?;

            if !self.has_calendar(&calendar.id) {
                return Err(StoreError::not_found(format!(
                    "no calendar with id {}",
                    calendar.id
                ))
                .with_store(STORE_NAME));
            }

            let events: Vec<EventRef> = lock(&self.events)
                .iter()
                .filter(|event| event.calendar.id == calendar.id)
                .filter(|event| window.overlaps(event.start, event.end))
                .cloned()
                .collect();
            Ok(events)
        })
    }

    fn save_event(&self, mut event: EventRef) -> BoxFuture<'_, StoreResult<EventRef>> {
        Box::pin(async move {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.record(StoreCall::SaveEvent(event.calendar.id.clone()));

            if self.reject_saves.load(Ordering::SeqCst) {
                return Err(StoreError::rejected("store is rejecting writes").with_store(STORE_NAME));
            }
            if event.end < event.start {
                return Err(StoreError::rejected(format!(
                    "event '{}' ends before it starts",
                    event.title
                ))
                .with_store(STORE_NAME));
            }
            if !self.has_calendar(&event.calendar.id) {
                return Err(StoreError::not_found(format!(
                    "no calendar with id {}",
                    event.calendar.id
                ))
                .with_store(STORE_NAME));
            }

            let id = format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
            event.id = Some(id);
            lock(&self.events).push(event.clone());
            lock(&self.saved).push(event.clone());
            debug!(event = %event.brief(), "Saved event");
            Ok(event)
        })
    }
}
