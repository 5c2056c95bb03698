use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use crate::telemetry::record_caption_request;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Json;
use petportrait::CaptionResult;
use serde::Deserialize;
use std::sync::Arc;

/// Body of `POST /captions/generate`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCaptionRequest {
    /// Bare base64 or a `data:image/<fmt>;base64,` URL
    #[serde(default)]
    pub image_base64: Option<String>,
}

/// Generates a caption and hashtags for an uploaded pet photo.
///
/// # Example
/// ```json
/// // Request
/// { "imageBase64": "data:image/jpeg;base64,/9j/4AAQ..." }
///
/// // Response
/// { "caption": "Max loves the park!", "hashtags": ["#dogpark", "#happydog"] }
/// ```
///
/// A missing, null or empty `imageBase64` is rejected before any remote call.
/// So is a body that is empty or not JSON-typed, which reads as `{}`.
pub async fn generate_caption(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<Json<CaptionResult>> {
    let result = run(&state, &headers, body).await;
    let status = match &result {
        Ok(_) => 200,
        Err(err) => err.status_code().as_u16(),
    };
    record_caption_request(status);
    result.map(Json)
}

async fn run(
    state: &ServerState,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<CaptionResult> {
    let max_mb = state.config.max_body_size_mb;
    let body = body.map_err(|rejection| ServerError::from_bytes_rejection(rejection, max_mb))?;
    let request = parse_request(headers, &body, max_mb)?;

    let image = request
        .image_base64
        .filter(|image| !image.trim().is_empty())
        .ok_or(ServerError::MissingImage)?;

    tracing::debug!(payload_chars = image.len(), "caption request accepted");
    Ok(state.pipeline.generate(&image).await?)
}

fn parse_request(
    headers: &HeaderMap,
    body: &[u8],
    max_mb: usize,
) -> ServerResult<GenerateCaptionRequest> {
    if !has_json_content_type(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateCaptionRequest::default());
    }
    let Json(request) = Json::<GenerateCaptionRequest>::from_bytes(body)
        .map_err(|rejection| ServerError::from_json_rejection(rejection, max_mb))?;
    Ok(request)
}

/// `application/json` or any `application/*+json` type.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}
