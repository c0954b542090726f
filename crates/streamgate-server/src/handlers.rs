use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use streamgate_core::AccessDecision;

use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "Streamgate Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    // Backend outages already surface per-request as 500s with log lines;
    // readiness only reports that the process is serving.
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

// ---- Stream protection ----

#[derive(Debug, Deserialize)]
pub struct ProtectQuery {
    #[serde(default)]
    pub stream_id: String,
    #[serde(default)]
    pub access_token: String,
}

/// `GET /hls/protect?stream_id=...&access_token=...`
///
/// Denials are expected business outcomes and map to 4xx; an infrastructure
/// failure means no decision was made and maps to 500 with the detail kept
/// out of the response body.
pub async fn protect_stream(
    State(state): State<AppState>,
    Query(params): Query<ProtectQuery>,
) -> impl IntoResponse {
    match state
        .authorizer
        .authorize(&params.stream_id, &params.access_token)
        .await
    {
        Ok(AccessDecision::Granted) => (
            StatusCode::OK,
            Json(json!({"status": "success", "message": "Stream access granted"})),
        ),
        Ok(AccessDecision::DeniedMissingParameters) => (
            StatusCode::BAD_REQUEST,
            Json(error_body("Missing required parameters")),
        ),
        Ok(AccessDecision::DeniedNotFound) => {
            (StatusCode::NOT_FOUND, Json(error_body("Stream not found")))
        }
        Ok(AccessDecision::DeniedInvalidToken) => (
            StatusCode::UNAUTHORIZED,
            Json(error_body("Invalid access token")),
        ),
        Err(e) => {
            tracing::error!(stream_id = %params.stream_id, error = ?e, "authorization check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_body("Authorization check failed")),
            )
        }
    }
}

/// `DELETE /admin/cache/{stream_id}`
///
/// Drops the cached token so the next check goes back to the store. Closes
/// the rotation staleness window on demand; the authorize path itself never
/// invalidates.
pub async fn invalidate_cache(
    State(state): State<AppState>,
    Path(stream_id): Path<String>,
) -> impl IntoResponse {
    match state.authorizer.invalidate(&stream_id).await {
        Ok(()) => (StatusCode::NO_CONTENT, ()).into_response(),
        Err(e) => {
            tracing::error!(stream_id = %stream_id, error = ?e, "cache invalidation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_body("Cache invalidation failed")),
            )
                .into_response()
        }
    }
}

fn error_body(message: &str) -> Value {
    json!({"status": "error", "message": message})
}
