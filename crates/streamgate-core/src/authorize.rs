//! The stream access authorization check.
//!
//! Cache-aside decision procedure: consult the Access Cache first, fall
//! through to the Token Store on a miss or mismatch, and repopulate the
//! cache after a store-confirmed grant.
//!
//! ## Decision rules
//!
//! - A cache hit can only shortcut to a grant, never to a denial; a stale
//!   cache must never deny access the store would grant.
//! - A cache transport error is a failure, not a miss. Falling through on
//!   every cache outage would shift full load onto the store and hide cache
//!   health from operators.
//! - Only a fresh store read can produce a terminal denial.
//! - The cache write after a store-confirmed grant is an optimization, not a
//!   gate: if it fails, the grant stands and the failure is logged.

use std::sync::Arc;
use std::time::Duration;

use crate::error::AuthorizeError;
use crate::traits::{AccessCache, AccessDecision, TokenStore};

/// Orchestrates authorization checks over injected cache and store handles.
///
/// Safe to share across concurrent request tasks; holds no mutable state of
/// its own. Each call performs at most one cache read, one store read, and
/// one cache write.
pub struct Authorizer {
    cache: Arc<dyn AccessCache>,
    store: Arc<dyn TokenStore>,
    cache_ttl: Option<Duration>,
}

impl Authorizer {
    /// Creates an authorizer over the given collaborators.
    ///
    /// Cached entries do not expire unless a TTL is set with
    /// [`with_cache_ttl`](Self::with_cache_ttl).
    pub fn new(cache: Arc<dyn AccessCache>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            cache,
            store,
            cache_ttl: None,
        }
    }

    /// Sets the TTL applied to repopulated cache entries.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Decides whether `supplied_token` grants access to `stream_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when the cache or the store cannot be reached; the
    /// decision could not be made and the caller must not treat this as a
    /// denial.
    pub async fn authorize(
        &self,
        stream_id: &str,
        supplied_token: &str,
    ) -> Result<AccessDecision, AuthorizeError> {
        if stream_id.is_empty() || supplied_token.is_empty() {
            return Ok(AccessDecision::DeniedMissingParameters);
        }

        match self.cache.get(stream_id).await? {
            Some(cached) if cached == supplied_token => {
                tracing::debug!(stream_id, "cache hit, token match");
                return Ok(AccessDecision::Granted);
            }
            Some(_) => {
                // The cached token may predate a rotation in the store, so a
                // mismatch is unproven, not disproven.
                tracing::debug!(stream_id, "cache hit, token mismatch, re-checking store");
            }
            None => {
                tracing::debug!(stream_id, "cache miss");
            }
        }

        let Some(expected) = self.store.lookup_token(stream_id).await? else {
            return Ok(AccessDecision::DeniedNotFound);
        };

        if expected != supplied_token {
            // Do not cache the token from an unauthorized attempt.
            return Ok(AccessDecision::DeniedInvalidToken);
        }

        if let Err(e) = self
            .cache
            .put(stream_id, supplied_token, self.cache_ttl)
            .await
        {
            tracing::warn!(
                stream_id,
                error = %e,
                "cache repopulation failed after store-confirmed grant"
            );
        }

        Ok(AccessDecision::Granted)
    }

    /// Removes the cached entry for a stream.
    ///
    /// The authorize path never calls this; a rotated token in the store
    /// keeps granting through the cache until a mismatched attempt forces a
    /// re-check. This hook lets an administrative caller close that window.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be reached.
    pub async fn invalidate(&self, stream_id: &str) -> Result<(), crate::error::CacheError> {
        self.cache.invalidate(stream_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use dashmap::DashMap;

    use super::*;
    use crate::error::{CacheError, StoreError};

    /// Token store over a map, counting lookups.
    #[derive(Default)]
    struct CountingStore {
        tokens: DashMap<String, String>,
        lookups: AtomicUsize,
    }

    impl CountingStore {
        fn with_token(stream_id: &str, token: &str) -> Self {
            let store = Self::default();
            store.tokens.insert(stream_id.into(), token.into());
            store
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl TokenStore for CountingStore {
        async fn lookup_token(&self, stream_id: &str) -> Result<Option<String>, StoreError> {
            self.lookups.fetch_add(1, Ordering::Relaxed);
            Ok(self.tokens.get(stream_id).map(|t| t.value().clone()))
        }
    }

    /// Store that fails every call.
    struct DownStore;

    #[async_trait]
    impl TokenStore for DownStore {
        async fn lookup_token(&self, _stream_id: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::unavailable("store is down"))
        }
    }

    /// Cache over a map, counting reads and writes.
    #[derive(Default)]
    struct CountingCache {
        entries: DashMap<String, String>,
        gets: AtomicUsize,
        puts: AtomicUsize,
    }

    impl CountingCache {
        fn with_entry(key: &str, value: &str) -> Self {
            let cache = Self::default();
            cache.entries.insert(key.into(), value.into());
            cache
        }

        fn cached(&self, key: &str) -> Option<String> {
            self.entries.get(key).map(|v| v.value().clone())
        }
    }

    #[async_trait]
    impl AccessCache for CountingCache {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            self.gets.fetch_add(1, Ordering::Relaxed);
            Ok(self.entries.get(key).map(|v| v.value().clone()))
        }

        async fn put(
            &self,
            key: &str,
            value: &str,
            _ttl: Option<Duration>,
        ) -> Result<(), CacheError> {
            self.puts.fetch_add(1, Ordering::Relaxed);
            self.entries.insert(key.into(), value.into());
            Ok(())
        }

        async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
            self.entries.remove(key);
            Ok(())
        }
    }

    /// Cache that fails every read but accepts writes.
    struct DownCache;

    #[async_trait]
    impl AccessCache for DownCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::unavailable("cache is down"))
        }

        async fn put(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Option<Duration>,
        ) -> Result<(), CacheError> {
            Err(CacheError::unavailable("cache is down"))
        }

        async fn invalidate(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::unavailable("cache is down"))
        }
    }

    /// Cache whose reads work but whose writes fail.
    struct ReadOnlyCache(CountingCache);

    #[async_trait]
    impl AccessCache for ReadOnlyCache {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            self.0.get(key).await
        }

        async fn put(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Option<Duration>,
        ) -> Result<(), CacheError> {
            Err(CacheError::unavailable("write refused"))
        }

        async fn invalidate(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::unavailable("write refused"))
        }
    }

    #[tokio::test]
    async fn cache_hit_grants_without_store_access() {
        // The store errors on any call, so a grant proves the cache alone
        // decided.
        let cache = Arc::new(CountingCache::with_entry("s1", "abc"));
        let authorizer = Authorizer::new(cache, Arc::new(DownStore));

        let decision = authorizer.authorize("s1", "abc").await.unwrap();
        assert_eq!(decision, AccessDecision::Granted);
    }

    #[tokio::test]
    async fn stale_cache_cannot_deny() {
        // Cache holds a rotated-out token; the store holds the current one.
        let cache = Arc::new(CountingCache::with_entry("s1", "old-token"));
        let store = Arc::new(CountingStore::with_token("s1", "new-token"));
        let authorizer = Authorizer::new(cache.clone(), store.clone());

        let decision = authorizer.authorize("s1", "new-token").await.unwrap();
        assert_eq!(decision, AccessDecision::Granted);
        assert_eq!(store.lookups(), 1);
        assert_eq!(cache.cached("s1").as_deref(), Some("new-token"));
    }

    #[tokio::test]
    async fn store_decides_on_cold_cache() {
        let store = Arc::new(CountingStore::with_token("s1", "abc"));

        // Match: granted and cache populated.
        let cache = Arc::new(CountingCache::default());
        let authorizer = Authorizer::new(cache.clone(), store.clone());
        let decision = authorizer.authorize("s1", "abc").await.unwrap();
        assert_eq!(decision, AccessDecision::Granted);
        assert_eq!(cache.cached("s1").as_deref(), Some("abc"));

        // Mismatch: denied and cache untouched.
        let cache = Arc::new(CountingCache::default());
        let authorizer = Authorizer::new(cache.clone(), store.clone());
        let decision = authorizer.authorize("s1", "wrong").await.unwrap();
        assert_eq!(decision, AccessDecision::DeniedInvalidToken);
        assert_eq!(cache.cached("s1"), None);

        // Absent row: not found and cache untouched.
        let cache = Arc::new(CountingCache::default());
        let authorizer = Authorizer::new(cache.clone(), store);
        let decision = authorizer.authorize("s2", "abc").await.unwrap();
        assert_eq!(decision, AccessDecision::DeniedNotFound);
        assert_eq!(cache.cached("s2"), None);
    }

    #[tokio::test]
    async fn missing_parameters_do_no_io() {
        let cache = Arc::new(CountingCache::default());
        let store = Arc::new(CountingStore::default());
        let authorizer = Authorizer::new(cache.clone(), store.clone());

        for (stream_id, token) in [("", "x"), ("x", ""), ("", "")] {
            let decision = authorizer.authorize(stream_id, token).await.unwrap();
            assert_eq!(decision, AccessDecision::DeniedMissingParameters);
        }

        assert_eq!(cache.gets.load(Ordering::Relaxed), 0);
        assert_eq!(cache.puts.load(Ordering::Relaxed), 0);
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn cache_outage_is_a_failure_not_a_fallthrough() {
        // The store would grant, but the decision must not be made.
        let store = Arc::new(CountingStore::with_token("s1", "abc"));
        let authorizer = Authorizer::new(Arc::new(DownCache), store.clone());

        let err = authorizer.authorize("s1", "abc").await.unwrap_err();
        assert!(matches!(err, AuthorizeError::Cache(_)));
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn store_outage_on_cache_miss_is_a_failure() {
        let cache = Arc::new(CountingCache::default());
        let authorizer = Authorizer::new(cache, Arc::new(DownStore));

        let err = authorizer.authorize("s1", "abc").await.unwrap_err();
        assert!(matches!(err, AuthorizeError::Store(_)));
    }

    #[tokio::test]
    async fn repopulation_makes_the_second_call_a_cache_hit() {
        let cache = Arc::new(CountingCache::default());
        let store = Arc::new(CountingStore::with_token("s1", "abc"));
        let authorizer = Authorizer::new(cache.clone(), store.clone());

        // First call: miss, one store read, one cache write.
        let decision = authorizer.authorize("s1", "abc").await.unwrap();
        assert_eq!(decision, AccessDecision::Granted);
        assert_eq!(store.lookups(), 1);
        assert_eq!(cache.puts.load(Ordering::Relaxed), 1);

        // Second call: hit, no further store reads.
        let decision = authorizer.authorize("s1", "abc").await.unwrap();
        assert_eq!(decision, AccessDecision::Granted);
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn cache_write_failure_does_not_revoke_the_grant() {
        let cache = Arc::new(ReadOnlyCache(CountingCache::default()));
        let store = Arc::new(CountingStore::with_token("s1", "abc"));
        let authorizer = Authorizer::new(cache, store);

        let decision = authorizer.authorize("s1", "abc").await.unwrap();
        assert_eq!(decision, AccessDecision::Granted);
    }

    #[tokio::test]
    async fn denied_attempt_leaves_prior_cache_entry_intact() {
        // Worked example: grant populates the cache, a later bad token is
        // denied against the store and the good entry survives.
        let cache = Arc::new(CountingCache::default());
        let store = Arc::new(CountingStore::with_token("s1", "abc"));
        let authorizer = Authorizer::new(cache.clone(), store.clone());

        assert_eq!(
            authorizer.authorize("s1", "abc").await.unwrap(),
            AccessDecision::Granted
        );
        assert_eq!(cache.cached("s1").as_deref(), Some("abc"));

        assert_eq!(
            authorizer.authorize("s1", "xyz").await.unwrap(),
            AccessDecision::DeniedInvalidToken
        );
        assert_eq!(cache.cached("s1").as_deref(), Some("abc"));

        assert_eq!(
            authorizer.authorize("s2", "any").await.unwrap(),
            AccessDecision::DeniedNotFound
        );
    }

    #[tokio::test]
    async fn invalidate_forces_the_next_call_back_to_the_store() {
        let cache = Arc::new(CountingCache::default());
        let store = Arc::new(CountingStore::with_token("s1", "abc"));
        let authorizer = Authorizer::new(cache, store.clone());

        authorizer.authorize("s1", "abc").await.unwrap();
        assert_eq!(store.lookups(), 1);

        authorizer.invalidate("s1").await.unwrap();

        authorizer.authorize("s1", "abc").await.unwrap();
        assert_eq!(store.lookups(), 2);
    }
}
