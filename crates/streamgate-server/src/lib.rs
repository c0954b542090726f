//! Streamgate - token-gated access control for protected media streams.
//!
//! An HTTP service that grants or denies access to a stream based on a
//! caller-supplied access token, using Redis as the hot lookup path and
//! PostgreSQL as the source of truth (cache-aside). The decision logic
//! itself lives in `streamgate-core`; this crate is the shell: config,
//! observability, routing, and wiring.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;

pub use config::{AppConfig, LoggingConfig, ServerConfig, StorageConfig};
pub use observability::{apply_logging_level, init_tracing};
pub use server::{AppState, ServerBuilder, StreamgateServer, build_app};
