use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use streamgate_cache_redis::RedisAccessCache;
use streamgate_core::Authorizer;
use streamgate_db_postgres::PostgresTokenStore;

use crate::{config::AppConfig, handlers, middleware as app_middleware};

/// Shared handles for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub authorizer: Arc<Authorizer>,
}

pub struct StreamgateServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        // Stream protection
        .route("/hls/protect", get(handlers::protect_stream))
        // Administrative cache invalidation
        .route("/admin/cache/{stream_id}", delete(handlers::invalidate_cache))
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .with_state(state)
}

pub struct ServerBuilder {
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    /// Connects to both backends and assembles the server.
    ///
    /// Either connection failing aborts startup; an unreachable backend at
    /// boot is an operator problem, not something to degrade around.
    pub async fn build(self) -> anyhow::Result<StreamgateServer> {
        let store = PostgresTokenStore::connect(&self.config.storage.postgres).await?;
        let cache = RedisAccessCache::connect(&self.config.cache).await?;

        let authorizer = Arc::new(
            Authorizer::new(Arc::new(cache), Arc::new(store))
                .with_cache_ttl(self.config.cache.ttl()),
        );

        let app = build_app(AppState { authorizer });

        Ok(StreamgateServer {
            addr: self.config.addr(),
            app,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamgateServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
