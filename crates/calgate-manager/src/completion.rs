//! Single-use completion handlers.
//!
//! A [`Completion`] wraps the handler that receives a guarded operation's
//! [`OperationResult`]. The handler runs at most once: the first report
//! wins and every later report is dropped with a warning. Handles are
//! cloneable so the executor can keep one while the guarded action holds
//! another.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use calgate_core::{CalEventError, OperationResult};
use tokio::sync::oneshot;
use tracing::warn;

type Handler<T> = Box<dyn FnOnce(OperationResult<T>) + Send>;

/// Reports a guarded operation's result to its handler.
pub struct Completion<T> {
    handler: Arc<Mutex<Option<Handler<T>>>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("completed", &self.is_completed())
            .finish()
    }
}

impl<T> Completion<T> {
    /// Wraps a callback as a completion.
    pub fn new<F>(handler: F) -> Self
    where
        F: FnOnce(OperationResult<T>) + Send + 'static,
    {
        Self {
            handler: Arc::new(Mutex::new(Some(Box::new(handler)))),
        }
    }

    /// Delivers `result` to the handler.
    ///
    /// Returns `false`, without invoking anything, if a result was already
    /// delivered through this or any cloned handle.
    pub fn complete(&self, result: OperationResult<T>) -> bool {
        let handler = self.slot().take();
        match handler {
            Some(handler) => {
                handler(result);
                true
            }
            None => {
                warn!(
                    dropped_success = result.is_ok(),
                    "Completion already delivered, dropping second result"
                );
                false
            }
        }
    }

    /// Delivers a success.
    pub fn succeed(&self, value: T) -> bool {
        self.complete(Ok(value))
    }

    /// Delivers a failure.
    pub fn fail(&self, error: CalEventError) -> bool {
        self.complete(Err(error))
    }

    /// Returns true once a result has been delivered.
    pub fn is_completed(&self) -> bool {
        self.slot().is_none()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Handler<T>>> {
        self.handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Awaitable side of a [`channel`].
///
/// Resolves to `Some(result)` once the paired completion is delivered, or
/// to `None` if every completion handle was dropped without a report.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<OperationResult<T>>,
}

impl<T> Future for Pending<T> {
    type Output = Option<OperationResult<T>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx).poll(cx).map(Result::ok)
    }
}

/// Creates a completion whose result can be awaited.
pub fn channel<T: Send + 'static>() -> (Completion<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    let completion = Completion::new(move |result| {
        // The receiver only goes away when the caller stopped waiting.
        let _ = tx.send(result);
    });
    (completion, Pending { rx })
}
