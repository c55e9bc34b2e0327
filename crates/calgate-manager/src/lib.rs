//! Authorization gate, guarded executor and calendar operations.
//!
//! This crate sequences "check permission, then run one unit of work" and
//! collapses every outcome into one [`OperationResult`]:
//!
//! - [`AuthorizationGate`] - Resolves calendar access, prompting at most once
//! - [`GuardedExecutor`] - Runs an action only after the gate succeeds
//! - [`Completion`] - Single-use handler receiving an operation's result
//! - [`CalendarManager`] - List calendars, find by title, list and insert events
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use calgate_manager::{CalendarManager, ManagerConfig};
//! use calgate_store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = CalendarManager::new(Arc::new(MemoryStore::new()), ManagerConfig::default());
//!
//!     match manager.list_events("Code_Cal").await {
//!         Ok(events) => events.iter().for_each(|e| println!("{}", e.brief())),
//!         Err(e) => eprintln!("error: {}", e),
//!     }
//! }
//! ```
//!
//! [`OperationResult`]: calgate_core::OperationResult

pub mod completion;
pub mod config;
pub mod executor;
pub mod gate;
pub mod manager;

pub use completion::{Completion, Pending};
pub use config::{ConfigError, MAX_EVENT_DURATION_MINUTES, ManagerConfig};
pub use executor::{ActionError, GuardedExecutor};
pub use gate::AuthorizationGate;
pub use manager::CalendarManager;
