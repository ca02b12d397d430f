use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::startup::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "tongue-service",
            "version": env!("CARGO_PKG_VERSION"),
            "provider": state.provider.name(),
            "model": state.provider.model(),
        })),
    )
}

/// Ready once the provider has its credential. Uploads work either way, but a
/// diagnosis cannot succeed until then.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.provider.is_configured() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "reason": "diagnosis provider is not configured"
            })),
        )
    }
}
