//! Redis backend for the Streamgate Access Cache.
//!
//! A thin wrapper over a deadpool-redis pool that maps stream ids to the
//! last-known-valid access token. Its one contract obligation is preserving
//! the miss/error distinction: a missing key is `Ok(None)`, while any
//! transport problem is surfaced as an error for the orchestrator to report.

pub mod client;
pub mod config;
pub mod error;

pub use client::RedisAccessCache;
pub use config::RedisCacheConfig;
pub use error::{RedisCacheError, Result};
