//! # View Scopes
//!
//! A view starts fetches whose results may arrive after it is gone. Fetches
//! spawned through a [`ViewScope`] always run to completion, so the caches
//! they feed still settle, but their results are only handed back while the
//! scope is open.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;

/// Lifetime of one view. Closing or dropping it releases every result that
/// has not been delivered yet.
#[derive(Debug)]
pub struct ViewScope {
    name: String,
    open: Arc<AtomicBool>,
}

impl ViewScope {
    /// Open a scope for the view called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Close the scope. Results of running tasks are discarded.
    pub fn close(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            tracing::debug!(view = %self.name, "view scope closed");
        }
    }

    /// Run `future` on the runtime, tied to this scope.
    pub fn spawn<F, T>(&self, future: F) -> ScopedTask<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        ScopedTask {
            view: self.name.clone(),
            open: Arc::clone(&self.open),
            handle: tokio::spawn(future),
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.close();
    }
}

/// A task spawned in a [`ViewScope`].
#[derive(Debug)]
pub struct ScopedTask<T> {
    view: String,
    open: Arc<AtomicBool>,
    handle: JoinHandle<T>,
}

impl<T> ScopedTask<T> {
    /// Wait for the task. `None` if the scope was closed by the time it
    /// finished, or if the task panicked.
    pub async fn result(self) -> Option<T> {
        match self.handle.await {
            Ok(value) if self.open.load(Ordering::Acquire) => Some(value),
            Ok(_) => {
                tracing::debug!(view = %self.view, "discarding result for closed view");
                None
            }
            Err(e) => {
                tracing::warn!(view = %self.view, error = %e, "view task failed");
                None
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn open_scope_delivers() {
        let scope = ViewScope::new("collection");
        let task = scope.spawn(async { 42 });
        assert_eq!(task.result().await, Some(42));
    }

    #[tokio::test]
    async fn closed_scope_discards_but_task_completes() {
        let scope = ViewScope::new("collection");
        let (done_tx, done_rx) = oneshot::channel();

        let task = scope.spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = done_tx.send(());
            "late"
        });
        scope.close();
        assert!(!scope.is_open());

        assert_eq!(task.result().await, None);
        assert!(done_rx.await.is_ok());
    }

    #[tokio::test]
    async fn dropping_the_scope_closes_it() {
        let scope = ViewScope::new("file");
        assert_eq!(scope.name(), "file");
        let task = scope.spawn(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            1
        });
        drop(scope);
        assert_eq!(task.result().await, None);
    }
}
