//! CalendarStore trait and the in-memory host store.
//!
//! This crate is the boundary between the calgate core and the host
//! platform's calendar subsystem:
//!
//! - [`CalendarStore`] - The trait a host implements over its calendar API
//! - [`StoreError`] - Errors a store reports back to the core
//! - [`MemoryStore`] - A store kept in process memory, with a scripted
//!   permission prompt
//!
//! # Example
//!
//! ```ignore
//! use calgate_store::{CalendarStore, MemoryStore};
//!
//! async fn titles(store: &dyn CalendarStore) -> Vec<String> {
//!     let calendars = store.calendars().await?;
//!     calendars.into_iter().map(|c| c.title).collect()
//! }
//! ```

pub mod error;
pub mod memory;
pub mod store;

pub use error::{StoreError, StoreErrorCode, StoreResult};
pub use memory::{MemoryStore, PromptAnswer, StoreCall};
pub use store::{BoxFuture, CalendarStore};
