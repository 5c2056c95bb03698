use crate::state::ServerState;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "petportrait-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// The pipeline and its clients exist once the state does, so this only
/// reports what is configured.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let bounds = state.pipeline.preprocess_config();
    Json(json!({
        "status": "ready",
        "service": "petportrait-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "api": "ready",
            "preprocess": format!("{}x{}", bounds.max_width, bounds.max_height),
            "vision": "ready",
            "caption": "ready",
            "metrics": if state.metrics.is_some() { "enabled" } else { "disabled" },
        }
    }))
}

/// Prometheus metrics endpoint
///
/// Falls back to an uptime summary when no recorder is installed.
pub async fn metrics(State(state): State<Arc<ServerState>>) -> Response {
    match &state.metrics {
        Some(handle) if state.config.metrics_enabled => (
            [(CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        _ => Json(json!({ "uptime_seconds": uptime_seconds() })).into_response(),
    }
}
