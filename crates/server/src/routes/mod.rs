//! API route handlers
//!
//! - `health`: liveness, readiness and metrics
//! - `captions`: photo to caption generation

pub mod captions;
pub mod health;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Welcome payload for `GET /`.
///
/// # Response
///
/// ```json
/// {
///   "message": "Welcome to the PetPortrait API",
///   "version": "0.1.0",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "message": "Welcome to the PetPortrait API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/captions/generate",
            "/api/captions/generate",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
