//! PostgreSQL backend for the Streamgate Token Store.
//!
//! The durable source of truth is a single `streams` table mapping stream id
//! to its authorized access token. This crate owns the connection pool, the
//! schema bootstrap, and the point lookup; it never writes token rows, which
//! belong to an external administrative process.

pub mod config;
pub mod error;
pub mod pool;
pub mod store;

pub use config::PostgresConfig;
pub use error::{PostgresError, Result};
pub use pool::create_pool;
pub use store::PostgresTokenStore;
