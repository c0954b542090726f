//! Core authorization logic for Streamgate.
//!
//! This crate holds the decision procedure that grants or denies access to a
//! protected stream: the [`Authorizer`] orchestrator, the [`AccessCache`] and
//! [`TokenStore`] traits it is wired against, and in-memory implementations
//! of both for tests and single-process development setups.
//!
//! Backends live in their own crates (`streamgate-cache-redis`,
//! `streamgate-db-postgres`); nothing here performs network I/O.

pub mod authorize;
pub mod error;
pub mod memory;
pub mod traits;

pub use authorize::Authorizer;
pub use error::{AuthorizeError, CacheError, StoreError};
pub use memory::{MemoryAccessCache, MemoryTokenStore};
pub use traits::{AccessCache, AccessDecision, TokenStore};
