//! Error types for the authorization core.
//!
//! The split matters: denial outcomes are values ([`AccessDecision`]), while
//! these types cover infrastructure failures only. A caller that sees an
//! error here knows the decision could not be made, not that access was
//! refused.
//!
//! [`AccessDecision`]: crate::traits::AccessDecision

/// Access Cache failure. Distinct from a cache miss, which is `Ok(None)` on
/// the [`AccessCache`](crate::traits::AccessCache) trait.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache could not be reached or the operation did not complete.
    #[error("cache unavailable: {message}")]
    Unavailable { message: String },
}

impl CacheError {
    /// Creates a new unavailability error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Token Store failure. Distinct from an absent row, which is `Ok(None)` on
/// the [`TokenStore`](crate::traits::TokenStore) trait.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or the query did not complete.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    /// Creates a new unavailability error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Failure of an authorization check, annotated with which collaborator
/// failed.
#[derive(Debug, thiserror::Error)]
pub enum AuthorizeError {
    #[error("cache unavailable")]
    Cache(#[source] CacheError),

    #[error("store unavailable")]
    Store(#[source] StoreError),
}

impl From<CacheError> for AuthorizeError {
    fn from(err: CacheError) -> Self {
        Self::Cache(err)
    }
}

impl From<StoreError> for AuthorizeError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}
