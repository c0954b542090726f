//! In-memory cache and store implementations.
//!
//! Used by the test suites and by single-process development setups where
//! neither Redis nor PostgreSQL is running. Both are thread-safe and never
//! return errors.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{CacheError, StoreError};
use crate::traits::{AccessCache, TokenStore};

struct CachedToken {
    value: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

/// Process-local Access Cache over a `DashMap`, with per-entry TTL.
#[derive(Default)]
pub struct MemoryAccessCache {
    entries: DashMap<String, CachedToken>,
}

impl MemoryAccessCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries, counting not-yet-evicted expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl AccessCache for MemoryAccessCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.value.clone()));
            }
            drop(entry);
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.entries.insert(
            key.to_string(),
            CachedToken {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Token Store over a `DashMap`.
///
/// Rows are inserted directly by tests or bootstrap code, standing in for
/// the administrative process that owns the durable table.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: DashMap<String, String>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the authorized token for a stream.
    pub fn insert(&self, stream_id: impl Into<String>, token: impl Into<String>) {
        self.tokens.insert(stream_id.into(), token.into());
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn lookup_token(&self, stream_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.tokens.get(stream_id).map(|t| t.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_invalidate() {
        let cache = MemoryAccessCache::new();

        cache.put("s1", "abc", None).await.unwrap();
        assert_eq!(cache.get("s1").await.unwrap().as_deref(), Some("abc"));

        cache.invalidate("s1").await.unwrap();
        assert_eq!(cache.get("s1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_overwrites() {
        let cache = MemoryAccessCache::new();

        cache.put("s1", "abc", None).await.unwrap();
        cache.put("s1", "def", None).await.unwrap();
        assert_eq!(cache.get("s1").await.unwrap().as_deref(), Some("def"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn ttl_expires_entries() {
        let cache = MemoryAccessCache::new();

        cache
            .put("s1", "abc", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        assert!(cache.get("s1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("s1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_lookup() {
        let store = MemoryTokenStore::new();
        store.insert("s1", "abc");

        assert_eq!(
            store.lookup_token("s1").await.unwrap().as_deref(),
            Some("abc")
        );
        assert_eq!(store.lookup_token("s2").await.unwrap(), None);
    }
}
