//! # Deduplicating Fetch Cache
//!
//! Async wrapper around [`CacheStore`]: the guard decides whether a caller
//! fetches, and every other caller for the same key waits for that one
//! fetch to settle and shares its result.
//!
//! The lock is a `std::sync::Mutex` and is never held across `.await`.
//! Waiters park on a `Notify` that is signalled whenever an entry settles.

use crate::ClientError;
use mercury_core::{CacheEntry, CacheKey, CacheStore, Dispatch, Ticket, dispatch_if_needed};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

/// What a caller does after consulting the cache.
enum Next<V> {
    Ready(Result<Arc<V>, ClientError>),
    Fetch(Ticket),
    Wait,
}

/// A cache of `V`s with at most one in-flight fetch per key.
#[derive(Debug)]
pub struct FetchCache<V> {
    name: &'static str,
    store: Mutex<CacheStore<Arc<V>, ClientError>>,
    settled: Notify,
}

/// Releases a pending entry if its fetch is dropped before settling, so
/// waiters fetch again instead of hanging.
struct PendingGuard<'a, V> {
    cache: &'a FetchCache<V>,
    key: &'a CacheKey,
    ticket: Ticket,
    armed: bool,
}

impl<V> Drop for PendingGuard<'_, V> {
    fn drop(&mut self) {
        if self.armed && self.cache.lock().release(self.key, self.ticket) {
            tracing::debug!(cache = self.cache.name, key = %self.key, "fetch abandoned");
            self.cache.settled.notify_waiters();
        }
    }
}

impl<V> FetchCache<V> {
    /// Create an empty cache. `name` only appears in logs.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            store: Mutex::new(CacheStore::new()),
            settled: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheStore<Arc<V>, ClientError>> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current entry for `key`.
    #[must_use]
    pub fn entry(&self, key: &CacheKey) -> Option<CacheEntry<Arc<V>, ClientError>> {
        self.lock().get(key).cloned()
    }

    /// Drop the entry for `key`.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let removed = self.lock().invalidate(key);
        if removed {
            tracing::debug!(cache = self.name, key = %key, "invalidated");
            self.settled.notify_waiters();
        }
        removed
    }

    /// Number of entries in any state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Decide what to do about `key`. `waited` is set once the caller has
    /// already waited for another fetch; a failure of that fetch is then
    /// returned instead of retried.
    fn next(&self, key: &CacheKey, waited: bool) -> Result<Next<V>, ClientError> {
        let mut store = self.lock();

        if waited {
            if let Some(CacheEntry::Failed(error)) = store.get(key) {
                return Ok(Next::Ready(Err(error.clone())));
            }
        }

        let reused = match dispatch_if_needed(&*store, |s| s.get(key), || ()) {
            Dispatch::Issued(()) => None,
            Dispatch::Reused(CacheEntry::Fulfilled(value)) => Some(Next::Ready(Ok(value.clone()))),
            Dispatch::Reused(CacheEntry::Failed(error)) => Some(Next::Ready(Err(error.clone()))),
            Dispatch::Reused(CacheEntry::Pending(_)) => Some(Next::Wait),
        };

        match reused {
            Some(next) => Ok(next),
            None => Ok(Next::Fetch(store.begin(key.clone())?)),
        }
    }

    /// Return the cached value for `key`, running `fetch` only if no fetch is
    /// fulfilled or in flight.
    ///
    /// Concurrent callers share one fetch. A failed fetch is stored and
    /// returned to its waiters; the next call after that fetches again.
    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetch: F) -> Result<Arc<V>, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ClientError>>,
    {
        let mut fetch = Some(fetch);
        let mut waited = false;

        loop {
            let notified = self.settled.notified();

            let ticket = match self.next(&key, waited)? {
                Next::Ready(result) => {
                    tracing::debug!(cache = self.name, key = %key, "cache hit");
                    return result;
                }
                Next::Wait => {
                    tracing::debug!(cache = self.name, key = %key, "waiting for pending fetch");
                    notified.await;
                    waited = true;
                    continue;
                }
                Next::Fetch(ticket) => ticket,
            };

            let mut guard = PendingGuard {
                cache: self,
                key: &key,
                ticket,
                armed: true,
            };

            let Some(fetch) = fetch.take() else {
                return Err(ClientError::Core(mercury_core::MercuryError::CachePending(
                    key.to_string(),
                )));
            };

            tracing::info!(cache = self.name, key = %key, "fetching");
            let result = fetch().await.map(Arc::new);
            guard.armed = false;

            {
                let mut store = self.lock();
                match &result {
                    Ok(value) => {
                        store.fulfil(&key, ticket, Arc::clone(value));
                    }
                    Err(error) => {
                        tracing::warn!(cache = self.name, key = %key, %error, "fetch failed");
                        store.fail(&key, ticket, error.clone());
                    }
                }
            }
            self.settled.notify_waiters();
            return result;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
