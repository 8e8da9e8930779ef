//! Debounced Trigger
//!
//! Collapses bursts of calls into one deferred call with the latest
//! arguments.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use smol::{Task, Timer};

use crate::lock;

/// Default quiet period before a debounced action runs
pub const DEFAULT_WAIT: Duration = Duration::from_millis(500);

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type BoxedAction<A> = Arc<dyn Fn(A) -> BoxFuture + Send + Sync>;

/// Wraps an async action so only the last call of a burst runs.
///
/// Each `call` restarts the wait window and replaces the captured arguments.
/// Dropping the debouncer cancels a pending call. Once the window has
/// elapsed the action runs detached and is unaffected by later calls.
pub struct Debounce<A> {
    wait: Duration,
    action: BoxedAction<A>,
    pending: Mutex<Option<Task<()>>>,
}

impl<A: Send + 'static> Debounce<A> {
    pub fn new<F, Fut>(wait: Duration, action: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            wait,
            action: Arc::new(move |args| -> BoxFuture { Box::pin(action(args)) }),
            pending: Mutex::new(None),
        }
    }

    /// Debounce with the default 500ms window
    pub fn with_default_wait<F, Fut>(action: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::new(DEFAULT_WAIT, action)
    }

    /// Schedule the action with `args`, discarding any call still waiting
    pub fn call(&self, args: A) {
        let action = Arc::clone(&self.action);
        let wait = self.wait;
        let task = smol::spawn(async move {
            Timer::after(wait).await;
            smol::spawn(action(args)).detach();
        });

        if let Some(previous) = lock(&self.pending).replace(task) {
            if !previous.is_finished() {
                tracing::trace!("debounce: superseded pending call");
            }
            // Dropping a task cancels it.
            drop(previous);
        }
    }

    /// Cancel the waiting call, if any. Returns true if one was canceled.
    pub fn cancel(&self) -> bool {
        match lock(&self.pending).take() {
            Some(task) => !task.is_finished(),
            None => false,
        }
    }

    /// Whether a call is waiting for its window to elapse
    pub fn is_pending(&self) -> bool {
        lock(&self.pending)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }
}

impl<A> std::fmt::Debug for Debounce<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounce")
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}
