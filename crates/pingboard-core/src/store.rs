use crate::types::{FetchResult, ProfileRecord};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// State of one identifier in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEntry<'a> {
    /// Never fetched, still in flight, or the last fetch failed.
    NotFetched,
    /// A fetch completed. `profile` is `None` for a confirmed absence.
    Fetched(&'a FetchResult),
}

/// The only action that changes the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileAction {
    Received {
        identifier: String,
        result: FetchResult,
    },
}

/// Last fetch result per user identifier. Values are replaced, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileCache {
    entries: HashMap<String, FetchResult>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new cache equal to `self` except that `identifier` maps to `result`.
    pub fn with_result(&self, identifier: &str, result: FetchResult) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(identifier.to_string(), result);
        Self { entries }
    }

    /// Apply an action, producing the next cache.
    pub fn reduce(&self, action: ProfileAction) -> Self {
        match action {
            ProfileAction::Received { identifier, result } => {
                self.with_result(&identifier, result)
            }
        }
    }

    pub fn entry(&self, identifier: &str) -> CacheEntry<'_> {
        match self.entries.get(identifier) {
            Some(result) => CacheEntry::Fetched(result),
            None => CacheEntry::NotFetched,
        }
    }

    /// The cached profile, if a fetch completed and found one.
    pub fn profile(&self, identifier: &str) -> Option<&ProfileRecord> {
        self.entries.get(identifier).and_then(|r| r.profile.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Owner of the current [`ProfileCache`] for one session.
///
/// Create one at session start and pass it to whatever fetches or renders
/// profiles; dropping it discards the cache. Readers get immutable snapshots,
/// so a render never observes a half-applied update.
#[derive(Debug, Default)]
pub struct ProfileStore {
    state: RwLock<Arc<ProfileCache>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<ProfileCache> {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Run the reducer and swap in the resulting cache.
    pub fn dispatch(&self, action: ProfileAction) {
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = guard.reduce(action);
        *guard = Arc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(title: &str) -> ProfileRecord {
        ProfileRecord {
            job_title: title.to_string(),
            ..Default::default()
        }
    }

    fn received(identifier: &str, result: FetchResult) -> ProfileAction {
        ProfileAction::Received {
            identifier: identifier.to_string(),
            result,
        }
    }

    #[test]
    fn test_missing_key_is_not_fetched() {
        let cache = ProfileCache::new();
        assert_eq!(cache.entry("bob"), CacheEntry::NotFetched);
        assert!(cache.profile("bob").is_none());
    }

    #[test]
    fn test_absent_is_distinct_from_not_fetched() {
        let cache = ProfileCache::new().with_result("bob", FetchResult::absent());
        assert_eq!(cache.entry("bob"), CacheEntry::Fetched(&FetchResult::absent()));
        assert!(cache.profile("bob").is_none());
    }

    #[test]
    fn test_reducer_leaves_input_untouched() {
        let before = ProfileCache::new().with_result("alice", FetchResult::found(profile("CEO")));
        let after = before.with_result("bob", FetchResult::absent());

        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
        assert_eq!(before.entry("bob"), CacheEntry::NotFetched);
    }

    #[test]
    fn test_reducer_is_idempotent() {
        let base = ProfileCache::new().with_result("alice", FetchResult::found(profile("CEO")));
        let action = received("bob", FetchResult::found(profile("CTO")));

        let once = base.reduce(action.clone());
        let twice = once.reduce(action);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_update_is_isolated_per_key() {
        let base = ProfileCache::new()
            .with_result("alice", FetchResult::found(profile("CEO")))
            .with_result("carol", FetchResult::absent());

        let next = base.reduce(received("bob", FetchResult::found(profile("CTO"))));
        assert_eq!(next.entry("alice"), base.entry("alice"));
        assert_eq!(next.entry("carol"), base.entry("carol"));

        let overwritten = next.reduce(received("alice", FetchResult::absent()));
        assert_eq!(overwritten.entry("bob"), next.entry("bob"));
        assert!(overwritten.profile("alice").is_none());
    }

    #[test]
    fn test_store_snapshots_are_stable() {
        let store = ProfileStore::new();
        let empty = store.snapshot();

        store.dispatch(received("alice", FetchResult::found(profile("CEO"))));

        assert!(empty.is_empty());
        assert_eq!(store.snapshot().profile("alice").unwrap().job_title, "CEO");
    }
}
