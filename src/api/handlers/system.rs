//! System handlers: service banner, health, fallback.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{SecondsFormat, Utc};

use crate::api::types::{Endpoints, ErrorResponse, HealthResponse, RootResponse};

/// Service banner listing the routes.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok",
        message: "EPUB Backend API",
        endpoints: Endpoints::default(),
    })
}

/// Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// JSON 404 for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Endpoint not found")),
    )
}
