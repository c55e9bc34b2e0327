//! High-level calendar operations.
//!
//! [`CalendarManager`] is the entry point UI layers call. Each operation is
//! a thin call-through: gate, one store call, map the outcome. Lookups by
//! title compose on top of [`CalendarManager::list_calendars`] rather than
//! running their own gate check, and every chain stops at the first failure.

use std::future::Future;
use std::sync::Arc;

use calgate_core::{
    CalEventError, CalendarRef, EventDraft, EventRef, OperationResult, TimeWindow,
};
use calgate_store::{CalendarStore, StoreError};
use chrono::Utc;
use tracing::{debug, error, warn};

use crate::completion::{self, Completion};
use crate::config::ManagerConfig;
use crate::executor::GuardedExecutor;
use crate::gate::AuthorizationGate;

/// Calendar operations behind one shared authorization gate.
///
/// Create one per process and share it (e.g. behind an `Arc`); operations
/// take `&self` and are independent of each other.
pub struct CalendarManager {
    store: Arc<dyn CalendarStore>,
    executor: GuardedExecutor,
    config: ManagerConfig,
}

impl std::fmt::Debug for CalendarManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarManager")
            .field("store", &self.store.name())
            .field("executor", &self.executor)
            .field("config", &self.config)
            .finish()
    }
}

impl CalendarManager {
    /// Creates a manager over `store`.
    pub fn new(store: Arc<dyn CalendarStore>, config: ManagerConfig) -> Self {
        let gate = AuthorizationGate::new(Arc::clone(&store));
        Self {
            store,
            executor: GuardedExecutor::new(gate),
            config,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn CalendarStore> {
        &self.store
    }

    /// Returns the guarded executor.
    pub fn executor(&self) -> &GuardedExecutor {
        &self.executor
    }

    /// Returns the authorization gate.
    pub fn gate(&self) -> &AuthorizationGate {
        self.executor.gate()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Confirms calendar access, prompting the user if needed.
    pub async fn check_authorization(&self) -> OperationResult<()> {
        self.guarded("check_authorization", || async {
            Ok::<(), CalEventError>(())
        })
        .await
    }

    /// Lists every event calendar.
    pub async fn list_calendars(&self) -> OperationResult<Vec<CalendarRef>> {
        let store = &self.store;
        self.guarded("list_calendars", || async move {
            store
                .calendars()
                .await
                .map_err(|e| store_failure("list_calendars", e, CalEventError::Unknown))
        })
        .await
    }

    /// Finds the first calendar titled `title`.
    pub async fn find_calendar(&self, title: &str) -> OperationResult<CalendarRef> {
        let calendars = self.list_calendars().await?;
        calendars
            .into_iter()
            .find(|calendar| calendar.title == title)
            .ok_or_else(|| {
                debug!(title, "No calendar with this title");
                CalEventError::CalendarNotFound
            })
    }

    /// Lists the events of the calendar titled `calendar_title` within the
    /// configured window, earliest first.
    pub async fn list_events(&self, calendar_title: &str) -> OperationResult<Vec<EventRef>> {
        self.list_events_in(calendar_title, self.config.event_window)
            .await
    }

    /// Lists the events of the calendar titled `calendar_title` that overlap
    /// `window`, earliest first.
    pub async fn list_events_in(
        &self,
        calendar_title: &str,
        window: TimeWindow,
    ) -> OperationResult<Vec<EventRef>> {
        let calendar = self.find_calendar(calendar_title).await?;
        let store = &self.store;
        let mut events = self
            .guarded("list_events", || async move {
                store
                    .events(calendar, window)
                    .await
                    .map_err(|e| store_failure("list_events", e, CalEventError::Unknown))
            })
            .await?;
        events.sort_by_key(|event| event.start);
        debug!(calendar = calendar_title, count = events.len(), "Listed events");
        Ok(events)
    }

    /// Saves `draft` into the calendar titled `calendar_title`.
    ///
    /// Fails with [`CalEventError::CalendarNotFound`] without writing
    /// anything if no such calendar exists.
    pub async fn insert_event(
        &self,
        draft: EventDraft,
        calendar_title: &str,
    ) -> OperationResult<EventRef> {
        let calendar = self.find_calendar(calendar_title).await?;
        self.save(draft.into_event(calendar)).await
    }

    /// Saves an event titled `title`, starting now and lasting the
    /// configured default duration, into the calendar titled
    /// `calendar_title`.
    ///
    /// Fails with [`CalEventError::SaveFailed`], without writing, if the
    /// event would end outside the representable time range.
    pub async fn insert_titled_event(
        &self,
        title: &str,
        calendar_title: &str,
    ) -> OperationResult<EventRef> {
        let calendar = self.find_calendar(calendar_title).await?;
        let duration = self.config.default_event_duration;
        let draft = EventDraft::starting_at(title, Utc::now(), duration).ok_or_else(|| {
            warn!(title, %duration, "Event end is out of range");
            CalEventError::SaveFailed
        })?;
        self.save(draft.into_event(calendar)).await
    }

    async fn save(&self, event: EventRef) -> OperationResult<EventRef> {
        let store = &self.store;
        self.guarded("insert_event", || async move {
            store
                .save_event(event)
                .await
                .map_err(|e| store_failure("insert_event", e, CalEventError::SaveFailed))
        })
        .await
    }

    /// Runs `action` behind the gate and waits for its single result.
    async fn guarded<T, F, Fut>(&self, operation: &'static str, action: F) -> OperationResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = OperationResult<T>>,
    {
        let (completion, pending) = completion::channel();
        self.executor
            .execute(
                |done: Completion<T>| async move {
                    done.complete(action().await);
                },
                completion,
            )
            .await;

        match pending.await {
            Some(result) => result,
            None => {
                error!(operation, "Guarded operation finished without a result");
                Err(CalEventError::Unknown)
            }
        }
    }
}

fn store_failure(operation: &str, e: StoreError, kind: CalEventError) -> CalEventError {
    warn!(operation, error = %e, kind = kind.as_str(), "Calendar store call failed");
    kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use calgate_core::AuthorizationState;
    use calgate_store::{MemoryStore, PromptAnswer, StoreCall};
    use chrono::{DateTime, Duration, TimeZone};

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn code_cal() -> CalendarRef {
        CalendarRef::new("cal-1", "Code_Cal")
    }

    fn home() -> CalendarRef {
        CalendarRef::new("cal-2", "Home")
    }

    fn seeded() -> MemoryStore {
        MemoryStore::new()
            .with_calendar(code_cal())
            .with_calendar(home())
            .with_event(
                EventDraft::new("Retro", utc(2019, 9, 20, 14), utc(2019, 9, 20, 15))
                    .into_event(code_cal()),
            )
            .with_event(
                EventDraft::new("Kickoff", utc(2019, 2, 4, 9), utc(2019, 2, 4, 10))
                    .into_event(code_cal()),
            )
            .with_event(
                EventDraft::new("Dentist", utc(2019, 5, 2, 8), utc(2019, 5, 2, 9))
                    .into_event(home()),
            )
            .with_event(
                EventDraft::new("Next year", utc(2020, 1, 6, 9), utc(2020, 1, 6, 10))
                    .into_event(code_cal()),
            )
    }

    fn manager_over(store: MemoryStore) -> (CalendarManager, Arc<MemoryStore>) {
        let store = Arc::new(store);
        (
            CalendarManager::new(store.clone(), ManagerConfig::default()),
            store,
        )
    }

    #[tokio::test]
    async fn check_authorization_succeeds_when_authorized() {
        let (manager, _store) = manager_over(seeded());
        assert_eq!(manager.check_authorization().await, Ok(()));
    }

    #[tokio::test]
    async fn list_calendars_returns_store_set() {
        let (manager, _store) = manager_over(seeded());
        assert_eq!(manager.list_calendars().await, Ok(vec![code_cal(), home()]));
    }

    #[tokio::test]
    async fn list_calendars_after_granted_prompt() {
        let (manager, store) = manager_over(
            seeded().with_state(AuthorizationState::NotDetermined),
        );

        assert_eq!(manager.list_calendars().await, Ok(vec![code_cal(), home()]));
        assert_eq!(store.prompt_count(), 1);
    }

    #[tokio::test]
    async fn list_calendars_after_refused_prompt() {
        let (manager, store) = manager_over(
            seeded()
                .with_state(AuthorizationState::NotDetermined)
                .with_prompt_answer(PromptAnswer::Deny),
        );

        assert_eq!(
            manager.list_calendars().await,
            Err(CalEventError::AccessDenied)
        );
        assert_eq!(store.fetch_count(), 0);
    }

    #[tokio::test]
    async fn restricted_store_is_unknown() {
        let (manager, _store) =
            manager_over(seeded().with_state(AuthorizationState::Restricted));
        assert_eq!(
            manager.check_authorization().await,
            Err(CalEventError::Unknown)
        );
    }

    #[tokio::test]
    async fn find_calendar_by_title() {
        let (manager, _store) = manager_over(seeded());

        assert_eq!(manager.find_calendar("Home").await, Ok(home()));
        assert_eq!(
            manager.find_calendar("No_Such_Calendar").await,
            Err(CalEventError::CalendarNotFound)
        );
    }

    #[tokio::test]
    async fn find_calendar_first_match_wins() {
        let duplicate = CalendarRef::new("cal-9", "Code_Cal");
        let (manager, _store) = manager_over(seeded().with_calendar(duplicate));

        assert_eq!(manager.find_calendar("Code_Cal").await, Ok(code_cal()));
    }

    #[tokio::test]
    async fn find_calendar_gates_once() {
        let (manager, store) = manager_over(seeded());
        manager.find_calendar("Home").await.unwrap();

        let queries = store
            .calls()
            .into_iter()
            .filter(|call| *call == StoreCall::QueryState)
            .count();
        assert_eq!(queries, 1);
    }

    #[tokio::test]
    async fn list_events_in_default_window_sorted() {
        let (manager, _store) = manager_over(seeded());

        let events = manager.list_events("Code_Cal").await.unwrap();
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Kickoff", "Retro"]);
        assert!(events.iter().all(|e| e.calendar == code_cal()));
    }

    #[tokio::test]
    async fn list_events_in_explicit_window() {
        let (manager, _store) = manager_over(seeded());
        let window = TimeWindow::new(utc(2020, 1, 1, 0), utc(2020, 2, 1, 0));

        let events = manager.list_events_in("Code_Cal", window).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Next year");
    }

    #[tokio::test]
    async fn list_events_uses_configured_window() {
        let store = Arc::new(seeded());
        let config = ManagerConfig::default()
            .with_event_window(TimeWindow::new(utc(2019, 9, 1, 0), utc(2019, 10, 1, 0)));
        let manager = CalendarManager::new(store, config);

        let events = manager.list_events("Code_Cal").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Retro");
    }

    #[tokio::test]
    async fn list_events_missing_calendar_short_circuits() {
        let (manager, store) = manager_over(seeded());

        assert_eq!(
            manager.list_events("No_Such_Calendar").await,
            Err(CalEventError::CalendarNotFound)
        );
        assert!(
            !store
                .calls()
                .iter()
                .any(|call| matches!(call, StoreCall::ListEvents(_)))
        );
    }

    #[tokio::test]
    async fn insert_event_into_existing_calendar() {
        let (manager, store) = manager_over(seeded());
        let draft = EventDraft::new("Demo", utc(2019, 11, 5, 10), utc(2019, 11, 5, 12));

        let saved = manager.insert_event(draft, "Code_Cal").await.unwrap();

        assert!(saved.is_saved());
        assert_eq!(saved.calendar, code_cal());
        assert_eq!(store.saved_events(), vec![saved]);
    }

    #[tokio::test]
    async fn insert_event_into_missing_calendar_writes_nothing() {
        let (manager, store) = manager_over(seeded());
        let draft = EventDraft::new("Demo", utc(2019, 11, 5, 10), utc(2019, 11, 5, 12));

        assert_eq!(
            manager.insert_event(draft, "No_Such_Calendar").await,
            Err(CalEventError::CalendarNotFound)
        );
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn rejected_save_is_save_failed() {
        let (manager, store) = manager_over(seeded().with_rejected_saves(true));

        assert_eq!(
            manager.insert_titled_event("from test", "Code_Cal").await,
            Err(CalEventError::SaveFailed)
        );
        assert_eq!(store.save_count(), 1);
        assert!(store.saved_events().is_empty());
    }

    #[tokio::test]
    async fn insert_titled_event_uses_default_duration() {
        let (manager, _store) = manager_over(seeded());
        let before = Utc::now();

        let saved = manager
            .insert_titled_event("rf add event", "Code_Cal")
            .await
            .unwrap();

        assert_eq!(saved.title, "rf add event");
        assert!(saved.start >= before);
        assert_eq!(saved.duration(), Duration::hours(2));
        assert_eq!(saved.calendar, code_cal());
    }

    #[tokio::test]
    async fn insert_inverted_event_is_save_failed() {
        let (manager, store) = manager_over(seeded());
        let draft = EventDraft {
            title: "Backwards".to_string(),
            start: utc(2019, 11, 5, 12),
            end: utc(2019, 11, 5, 10),
        };

        assert_eq!(
            manager.insert_event(draft, "Code_Cal").await,
            Err(CalEventError::SaveFailed)
        );
        assert!(store.saved_events().is_empty());
    }

    #[tokio::test]
    async fn titled_event_past_time_range_is_save_failed() {
        let store = Arc::new(seeded());
        let config = ManagerConfig {
            default_event_duration: Duration::MAX,
            ..ManagerConfig::default()
        };
        let manager = CalendarManager::new(store.clone(), config);

        assert_eq!(
            manager.insert_titled_event("forever", "Code_Cal").await,
            Err(CalEventError::SaveFailed)
        );
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn titled_event_with_clamped_duration() {
        let store = Arc::new(seeded());
        let config = ManagerConfig::default().with_default_event_duration(Duration::MAX);
        let manager = CalendarManager::new(store, config);

        let saved = manager
            .insert_titled_event("long haul", "Code_Cal")
            .await
            .unwrap();
        assert_eq!(saved.duration(), Duration::days(366));
    }

    #[tokio::test]
    async fn unavailable_calendars_are_unknown() {
        let (manager, store) = manager_over(seeded().with_unavailable_calendars(true));

        assert_eq!(
            manager.list_calendars().await,
            Err(CalEventError::Unknown)
        );
        assert_eq!(
            manager.find_calendar("Code_Cal").await,
            Err(CalEventError::Unknown)
        );
        assert_eq!(
            manager.list_events("Code_Cal").await,
            Err(CalEventError::Unknown)
        );
        assert_eq!(
            manager.insert_titled_event("blocked", "Code_Cal").await,
            Err(CalEventError::Unknown)
        );
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn unavailable_events_are_unknown() {
        let (manager, store) = manager_over(seeded().with_unavailable_events(true));

        assert_eq!(manager.find_calendar("Code_Cal").await, Ok(code_cal()));
        assert_eq!(
            manager.list_events("Code_Cal").await,
            Err(CalEventError::Unknown)
        );
        assert!(
            store
                .calls()
                .contains(&StoreCall::ListEvents(code_cal().id))
        );
    }

    #[tokio::test]
    async fn force_denied_blocks_every_operation() {
        let (manager, store) = manager_over(seeded());
        manager.gate().set_denied_for_testing(true);
        let draft = EventDraft::new("Demo", utc(2019, 11, 5, 10), utc(2019, 11, 5, 12));

        assert_eq!(
            manager.check_authorization().await,
            Err(CalEventError::AccessDenied)
        );
        assert_eq!(
            manager.list_calendars().await,
            Err(CalEventError::AccessDenied)
        );
        assert_eq!(
            manager.find_calendar("Code_Cal").await,
            Err(CalEventError::AccessDenied)
        );
        assert_eq!(
            manager.list_events("Code_Cal").await,
            Err(CalEventError::AccessDenied)
        );
        assert_eq!(
            manager.insert_event(draft, "Code_Cal").await,
            Err(CalEventError::AccessDenied)
        );

        assert!(store.calls().is_empty());
        assert_eq!(store.fetch_count(), 0);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_operations_are_independent() {
        let (manager, store) = manager_over(seeded());
        let manager = Arc::new(manager);

        let mut handles = Vec::new();
        for i in 0..8 {
            let manager = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    manager.list_calendars().await.map(|c| c.len())
                } else {
                    manager.list_events("Code_Cal").await.map(|e| e.len())
                }
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(2));
        }
        assert_eq!(store.prompt_count(), 0);
    }
}
