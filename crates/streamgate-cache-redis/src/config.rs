//! Configuration types for the Redis access cache backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the Redis access cache backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,

    /// Connection timeout in milliseconds
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,

    /// TTL in seconds for cached tokens.
    /// Unset means entries never expire and persist until invalidated or
    /// evicted by Redis' own memory policy.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> usize {
    10
}

fn default_redis_timeout_ms() -> u64 {
    5000
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
            ttl_secs: None,
        }
    }
}

impl RedisCacheConfig {
    /// TTL applied to cached tokens, if configured.
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}
