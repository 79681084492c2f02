//! Liveness endpoints

use axum::{
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "musicracy-kv".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /ping
///
/// Used by players and front ends to wait for the store at startup.
pub async fn ping() -> Response {
    ([(header::CONTENT_TYPE, "text/plain")], "PONG").into_response()
}

/// Unrouted requests: GETs whose path ends in "ping" are answered, the rest 404
pub async fn fallback(method: Method, uri: Uri) -> Response {
    if method == Method::GET && uri.path().to_ascii_lowercase().ends_with("ping") {
        return ping().await;
    }
    StatusCode::NOT_FOUND.into_response()
}
