//! # Fetch Cache
//!
//! Explicit key-value store of fetch results plus the guard that decides
//! whether a fetch has to be issued at all.
//!
//! ## Entry Lifecycle
//!
//! ```text
//! absent ──begin──▶ Pending ──fulfil──▶ Fulfilled
//!                      │
//!                      └────fail────▶ Failed ──begin (retry)──▶ Pending
//! ```
//!
//! - Transitions out of `Pending` are monotonic.
//! - `begin` refuses a key that is already pending: at most one fetch per key
//!   is in flight.
//! - Every `begin` hands out a [`Ticket`]. A result only lands if the entry is
//!   still pending under the same ticket, so a fetch that outlived an
//!   invalidation cannot overwrite newer state.

use crate::MercuryError;
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// KEYS & ENTRIES
// =============================================================================

/// Identity of a cached fetch: the kind of data plus its key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CacheKey {
    /// The session's shape graph.
    Vocabulary,
    /// Raw JSON-LD of one subject.
    JsonLd(String),
    /// Combined property descriptors of one subject.
    Combined(String),
    /// Entities of one class.
    EntitiesByType(String),
    /// Entities of every Fairspace class.
    AllEntities,
    /// Subject IRI resolved from a storage path.
    SubjectByPath(String),
}

impl CacheKey {
    /// The subject this key belongs to, for subject-scoped kinds.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::JsonLd(subject) | Self::Combined(subject) => Some(subject),
            _ => None,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vocabulary => write!(f, "vocabulary"),
            Self::JsonLd(subject) => write!(f, "jsonLdBySubject[{subject}]"),
            Self::Combined(subject) => write!(f, "metadataBySubject[{subject}]"),
            Self::EntitiesByType(class) => write!(f, "entitiesByType[{class}]"),
            Self::AllEntities => write!(f, "allEntities"),
            Self::SubjectByPath(path) => write!(f, "subjectByPath[{path}]"),
        }
    }
}

/// Identifies one `begin` of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// Status of a cache key, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Absent,
    Pending,
    Fulfilled,
    Failed,
}

/// State stored for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry<V, E> {
    /// A fetch is in flight.
    Pending(Ticket),
    /// The fetch resolved.
    Fulfilled(V),
    /// The fetch failed; the next explicit request retries.
    Failed(E),
}

impl<V, E> CacheEntry<V, E> {
    #[must_use]
    pub fn status(&self) -> CacheStatus {
        match self {
            Self::Pending(_) => CacheStatus::Pending,
            Self::Fulfilled(_) => CacheStatus::Fulfilled,
            Self::Failed(_) => CacheStatus::Failed,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    fn pending_ticket(&self) -> Option<Ticket> {
        match self {
            Self::Pending(ticket) => Some(*ticket),
            _ => None,
        }
    }
}

// =============================================================================
// CACHE STORE
// =============================================================================

/// Injectable fetch cache.
///
/// Deterministic: entries live in a `BTreeMap`, tickets come from a counter.
#[derive(Debug, Clone)]
pub struct CacheStore<V, E> {
    entries: BTreeMap<CacheKey, CacheEntry<V, E>>,
    next_ticket: u64,
}

impl<V, E> Default for CacheStore<V, E> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_ticket: 0,
        }
    }
}

impl<V, E> CacheStore<V, E> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The entry for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry<V, E>> {
        self.entries.get(key)
    }

    /// The status of `key`.
    #[must_use]
    pub fn status(&self, key: &CacheKey) -> CacheStatus {
        self.get(key)
            .map(CacheEntry::status)
            .unwrap_or(CacheStatus::Absent)
    }

    /// Mark `key` as pending.
    ///
    /// Fails with `CachePending` if a fetch for the key is already in flight.
    /// Fulfilled and failed entries are replaced.
    pub fn begin(&mut self, key: CacheKey) -> Result<Ticket, MercuryError> {
        if self.get(&key).is_some_and(CacheEntry::is_pending) {
            return Err(MercuryError::CachePending(key.to_string()));
        }
        let ticket = Ticket(self.next_ticket);
        self.next_ticket = self.next_ticket.saturating_add(1);
        self.entries.insert(key, CacheEntry::Pending(ticket));
        Ok(ticket)
    }

    fn settle(&mut self, key: &CacheKey, ticket: Ticket, entry: CacheEntry<V, E>) -> bool {
        match self.entries.get_mut(key) {
            Some(slot) if slot.pending_ticket() == Some(ticket) => {
                *slot = entry;
                true
            }
            _ => false,
        }
    }

    /// Store the result of the fetch started with `ticket`.
    ///
    /// Returns `false` (and drops `value`) when the entry was invalidated or
    /// restarted since.
    pub fn fulfil(&mut self, key: &CacheKey, ticket: Ticket, value: V) -> bool {
        self.settle(key, ticket, CacheEntry::Fulfilled(value))
    }

    /// Record the failure of the fetch started with `ticket`.
    pub fn fail(&mut self, key: &CacheKey, ticket: Ticket, error: E) -> bool {
        self.settle(key, ticket, CacheEntry::Failed(error))
    }

    /// Drop a pending entry whose fetch will never settle.
    ///
    /// Only removes the entry if it is still pending under `ticket`.
    pub fn release(&mut self, key: &CacheKey, ticket: Ticket) -> bool {
        if self.get(key).and_then(CacheEntry::pending_ticket) == Some(ticket) {
            self.entries.remove(key);
            return true;
        }
        false
    }

    /// Drop the entry for `key`. Returns whether one existed.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry whose key matches. Returns how many were dropped.
    pub fn invalidate_where(&mut self, mut predicate: impl FnMut(&CacheKey) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !predicate(key));
        before - self.entries.len()
    }

    /// Number of entries, in any state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// DISPATCH GUARD
// =============================================================================

/// Outcome of [`dispatch_if_needed`].
#[derive(Debug, PartialEq)]
pub enum Dispatch<'a, R, V, E> {
    /// The action creator ran; its result is returned.
    Issued(R),
    /// A pending or fulfilled entry exists and is reused.
    Reused(&'a CacheEntry<V, E>),
}

/// Issue a fetch only when the cache does not already cover it.
///
/// `lookup` reads the entry from `state`. When it is absent or failed,
/// `action_creator` runs and its result is returned as `Issued`. Pending and
/// fulfilled entries are returned as `Reused` without running it, so
/// repeated calls from several views never start a second fetch for a key.
pub fn dispatch_if_needed<'a, S, V, E, R>(
    state: &'a S,
    lookup: impl FnOnce(&'a S) -> Option<&'a CacheEntry<V, E>>,
    action_creator: impl FnOnce() -> R,
) -> Dispatch<'a, R, V, E> {
    match lookup(state) {
        None | Some(CacheEntry::Failed(_)) => Dispatch::Issued(action_creator()),
        Some(entry) => Dispatch::Reused(entry),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    type Store = CacheStore<String, String>;

    fn key() -> CacheKey {
        CacheKey::JsonLd("http://example.com/1".to_string())
    }

    #[test]
    fn absent_entry_issues_the_action() {
        let store = Store::new();
        let calls = Cell::new(0);
        let outcome = dispatch_if_needed(&store, |s| s.get(&key()), || calls.set(calls.get() + 1));
        assert_eq!(outcome, Dispatch::Issued(()));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn pending_entry_is_not_fetched_twice() {
        let mut store = Store::new();
        let calls = Cell::new(0);
        let fetch = || calls.set(calls.get() + 1);

        let first = dispatch_if_needed(&store, |s| s.get(&key()), fetch);
        let issued = matches!(first, Dispatch::Issued(()));
        if issued {
            store.begin(key()).expect("begin");
        }
        let second = dispatch_if_needed(&store, |s| s.get(&key()), fetch);

        assert!(matches!(second, Dispatch::Reused(CacheEntry::Pending(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn fulfilled_entry_is_reused() {
        let mut store = Store::new();
        let ticket = store.begin(key()).expect("begin");
        assert!(store.fulfil(&key(), ticket, "value".to_string()));

        let calls = Cell::new(0);
        for _ in 0..3 {
            let outcome =
                dispatch_if_needed(&store, |s| s.get(&key()), || calls.set(calls.get() + 1));
            assert_eq!(
                outcome,
                Dispatch::Reused(&CacheEntry::Fulfilled("value".to_string()))
            );
        }
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn failed_entry_is_retried() {
        let mut store = Store::new();
        let ticket = store.begin(key()).expect("begin");
        assert!(store.fail(&key(), ticket, "boom".to_string()));
        assert_eq!(store.status(&key()), CacheStatus::Failed);

        let outcome = dispatch_if_needed(&store, |s| s.get(&key()), || "retry");
        assert_eq!(outcome, Dispatch::Issued("retry"));

        assert!(store.begin(key()).is_ok());
        assert_eq!(store.status(&key()), CacheStatus::Pending);
    }

    #[test]
    fn begin_refuses_a_pending_key() {
        let mut store = Store::new();
        store.begin(key()).expect("begin");
        assert_eq!(
            store.begin(key()),
            Err(MercuryError::CachePending(key().to_string()))
        );
    }

    #[test]
    fn stale_ticket_cannot_settle() {
        let mut store = Store::new();
        let stale = store.begin(key()).expect("begin");
        assert!(store.invalidate(&key()));
        let fresh = store.begin(key()).expect("restart");

        assert!(!store.fulfil(&key(), stale, "old".to_string()));
        assert_eq!(store.status(&key()), CacheStatus::Pending);
        assert!(store.fulfil(&key(), fresh, "new".to_string()));
        assert_eq!(
            store.get(&key()),
            Some(&CacheEntry::Fulfilled("new".to_string()))
        );
    }

    #[test]
    fn release_only_drops_its_own_pending_entry() {
        let mut store = Store::new();
        let ticket = store.begin(key()).expect("begin");
        assert!(store.fulfil(&key(), ticket, "done".to_string()));
        assert!(!store.release(&key(), ticket));
        assert_eq!(store.status(&key()), CacheStatus::Fulfilled);

        let other = CacheKey::AllEntities;
        let abandoned = store.begin(other.clone()).expect("begin");
        assert!(store.release(&other, abandoned));
        assert_eq!(store.status(&other), CacheStatus::Absent);
    }

    #[test]
    fn settled_entries_do_not_change_again() {
        let mut store = Store::new();
        let ticket = store.begin(key()).expect("begin");
        assert!(store.fulfil(&key(), ticket, "first".to_string()));
        assert!(!store.fail(&key(), ticket, "late".to_string()));
        assert_eq!(store.status(&key()), CacheStatus::Fulfilled);
    }

    #[test]
    fn invalidate_where_drops_matching_keys() {
        let mut store = Store::new();
        store.begin(key()).expect("begin");
        store
            .begin(CacheKey::Combined("http://example.com/1".to_string()))
            .expect("begin");
        store.begin(CacheKey::Vocabulary).expect("begin");

        let dropped = store.invalidate_where(|k| k.subject() == Some("http://example.com/1"));
        assert_eq!(dropped, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.status(&CacheKey::Vocabulary), CacheStatus::Pending);
    }

    #[test]
    fn keys_display_like_state_paths() {
        assert_eq!(CacheKey::Vocabulary.to_string(), "vocabulary");
        assert_eq!(
            CacheKey::SubjectByPath("/a/b".into()).to_string(),
            "subjectByPath[/a/b]"
        );
    }
}
