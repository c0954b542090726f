//! Collaborator traits and the terminal decision type.
//!
//! Both traits preserve the miss/error distinction the orchestrator depends
//! on: `Ok(None)` means genuine absence, `Err` means the call could not be
//! completed. Implementations must not conflate the two even if the
//! underlying client library does.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CacheError, StoreError};

/// Terminal, non-error outcome of an authorization check.
///
/// Infrastructure failures are not represented here; they surface as
/// [`AuthorizeError`](crate::error::AuthorizeError) instead, so a caller can
/// never mistake an outage for a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The supplied token is valid for the stream.
    Granted,
    /// The stream exists but the supplied token does not match.
    DeniedInvalidToken,
    /// No record exists for the stream.
    DeniedNotFound,
    /// The stream id or token was empty; no lookup was performed.
    DeniedMissingParameters,
}

impl AccessDecision {
    /// Whether this decision grants access.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Fast key/value layer mapping stream id to the last-known-valid token.
///
/// The cache may be cold or stale relative to the Token Store; the
/// orchestrator resolves staleness by falling through to the store, so
/// implementations carry no consistency obligations beyond per-key atomic
/// get/put.
#[async_trait]
pub trait AccessCache: Send + Sync {
    /// Look up the cached token for a stream.
    ///
    /// `Ok(None)` is a miss. Any `Err` means the cache could not be
    /// consulted and must not be treated as a miss.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Unconditionally overwrite the cached token for a stream.
    ///
    /// `ttl = None` means the entry does not expire.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Remove the cached token for a stream, if any.
    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}

/// Durable source of truth mapping stream id to the authorized token.
///
/// Read-only from the core's perspective; rows are created and rotated by an
/// external administrative process.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Fetch the current authorized token for a stream.
    ///
    /// `Ok(None)` means no such stream. Any `Err` means the store could not
    /// be queried.
    async fn lookup_token(&self, stream_id: &str) -> Result<Option<String>, StoreError>;
}
