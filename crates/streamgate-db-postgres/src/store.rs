//! Token lookups against the `streams` table.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgPool;
use tracing::{debug, info, instrument};

use streamgate_core::{StoreError, TokenStore};

use crate::config::PostgresConfig;
use crate::error::Result;
use crate::pool::create_pool;

/// Token Store over a PostgreSQL `streams` table.
///
/// Read-only at runtime: rows are created and rotated by an external
/// administrative process, and the single query issued here is a point
/// lookup by primary key.
#[derive(Debug, Clone)]
pub struct PostgresTokenStore {
    pool: PgPool,
}

impl PostgresTokenStore {
    /// Connects to the database and, if configured, bootstraps the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or the schema
    /// bootstrap fails.
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        let pool = create_pool(config).await?;

        if config.run_migrations {
            ensure_schema(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Wraps an existing pool. Used by tests that manage their own schema.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fetches the authorized token for a stream, if a row exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn lookup_token(&self, stream_id: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = query_as(
            r#"
            SELECT access_token
            FROM streams
            WHERE stream_id = $1
            "#,
        )
        .bind(stream_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(token,)| token))
    }
}

#[async_trait]
impl TokenStore for PostgresTokenStore {
    async fn lookup_token(&self, stream_id: &str) -> std::result::Result<Option<String>, StoreError> {
        PostgresTokenStore::lookup_token(self, stream_id)
            .await
            .map_err(StoreError::from)
    }
}

/// Creates the `streams` table if it does not exist.
async fn ensure_schema(pool: &PgPool) -> Result<()> {
    debug!("Ensuring streams table exists");

    query(
        r#"
        CREATE TABLE IF NOT EXISTS streams (
            stream_id TEXT PRIMARY KEY,
            access_token TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("streams table ready");

    Ok(())
}
