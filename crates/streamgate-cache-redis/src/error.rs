//! Error types for the Redis access cache backend.

use streamgate_core::CacheError;

/// Errors specific to the Redis access cache backend.
#[derive(Debug, thiserror::Error)]
pub enum RedisCacheError {
    /// Pool could not be created from the configuration.
    #[error("Redis pool configuration error: {0}")]
    CreatePool(#[from] deadpool_redis::CreatePoolError),

    /// A connection could not be acquired from the pool.
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// A command failed after a connection was acquired.
    #[error("Redis command error: {0}")]
    Command(#[from] redis::RedisError),
}

impl From<RedisCacheError> for CacheError {
    fn from(err: RedisCacheError) -> Self {
        CacheError::unavailable(err.to_string())
    }
}

/// Result type alias for Redis cache operations.
pub type Result<T> = std::result::Result<T, RedisCacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_to_cache_error() {
        let pool_err = deadpool_redis::PoolError::Closed;
        let err: CacheError = RedisCacheError::from(pool_err).into();
        assert!(matches!(err, CacheError::Unavailable { .. }));
    }
}
