//! Access cache client over a deadpool-redis pool.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Pool, Runtime};
use redis::AsyncCommands;
use tracing::{debug, info};

use streamgate_core::{AccessCache, CacheError};

use crate::config::RedisCacheConfig;
use crate::error::Result;

/// Access Cache over Redis.
///
/// One logical key per stream id, holding the last token the authorization
/// check confirmed against the store. Transport errors are returned to the
/// caller; a missing key is the only condition reported as a miss.
#[derive(Clone)]
pub struct RedisAccessCache {
    pool: Pool,
}

impl RedisAccessCache {
    /// Builds the pool and verifies connectivity by acquiring a connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or no connection can
    /// be established.
    pub async fn connect(config: &RedisCacheConfig) -> Result<Self> {
        info!(url = %config.url, "Connecting to Redis");

        let mut redis_config = deadpool_redis::Config::from_url(&config.url);
        let mut pool_config = redis_config.pool.take().unwrap_or_default();
        pool_config.max_size = config.pool_size;
        pool_config.timeouts.wait = Some(Duration::from_millis(config.timeout_ms));
        pool_config.timeouts.create = Some(Duration::from_millis(config.timeout_ms));
        pool_config.timeouts.recycle = Some(Duration::from_millis(config.timeout_ms));
        redis_config.pool = Some(pool_config);

        let pool = redis_config.create_pool(Some(Runtime::Tokio1))?;

        // Fail fast at startup rather than on the first request.
        drop(pool.get().await?);

        debug!("Redis connection pool created successfully");

        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    /// Retrieves the cached token for a key. `Ok(None)` means the key is
    /// absent.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.pool.get().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    /// Unconditionally overwrites the token for a key.
    ///
    /// With `ttl = None` the entry persists until invalidated or evicted by
    /// Redis' own memory policy.
    pub async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.pool.get().await?;
        match ttl {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    /// Removes the token for a key, if present.
    pub async fn invalidate(&self, key: &str) -> Result<()> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    /// Closes the underlying pool. Idempotent; later calls are no-ops and
    /// in-flight operations fail with a pool error.
    pub fn close(&self) {
        self.pool.close();
    }
}

#[async_trait]
impl AccessCache for RedisAccessCache {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, CacheError> {
        RedisAccessCache::get(self, key).await.map_err(CacheError::from)
    }

    async fn put(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> std::result::Result<(), CacheError> {
        RedisAccessCache::put(self, key, value, ttl)
            .await
            .map_err(CacheError::from)
    }

    async fn invalidate(&self, key: &str) -> std::result::Result<(), CacheError> {
        RedisAccessCache::invalidate(self, key)
            .await
            .map_err(CacheError::from)
    }
}
