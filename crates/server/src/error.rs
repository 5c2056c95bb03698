use axum::extract::rejection::{BytesRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use petportrait::PipelineError;
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Image data is required")]
    MissingImage,

    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Payload too large: max {0}MB allowed")]
    PayloadTooLarge(usize),

    #[error("Failed to generate caption: {0}")]
    Caption(#[from] PipelineError),

    #[error("Not found")]
    NotFound,
}

/// JSON error body: `{"error": ..., "details"?: ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ServerError {
    /// Maps a body read failure; `max_body_size_mb` is reported for oversized bodies.
    pub fn from_bytes_rejection(rejection: BytesRejection, max_body_size_mb: usize) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(max_body_size_mb)
        } else {
            ServerError::InvalidJson(rejection.body_text())
        }
    }

    /// Maps a JSON parse failure of an already buffered body.
    pub fn from_json_rejection(rejection: JsonRejection, max_body_size_mb: usize) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => ServerError::MissingImage,
            JsonRejection::BytesRejection(inner) => {
                Self::from_bytes_rejection(inner, max_body_size_mb)
            }
            other => ServerError::InvalidJson(other.body_text()),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::MissingImage | ServerError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Caption(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::MissingImage => "MISSING_IMAGE",
            ServerError::InvalidJson(_) => "INVALID_JSON",
            ServerError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ServerError::Caption(_) => "CAPTION_FAILED",
            ServerError::NotFound => "NOT_FOUND",
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ServerError::MissingImage => ErrorResponse {
                error: "Image data is required".into(),
                details: None,
            },
            ServerError::InvalidJson(details) => ErrorResponse {
                error: "Invalid JSON body".into(),
                details: Some(details.clone()),
            },
            ServerError::Caption(err) => ErrorResponse {
                error: "Failed to generate caption".into(),
                details: Some(err.to_string()),
            },
            ServerError::NotFound => ErrorResponse {
                error: "Not found".into(),
                details: None,
            },
            ServerError::PayloadTooLarge(_) => ErrorResponse {
                error: self.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::warn!(code = self.error_code(), error = %self, "request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}
