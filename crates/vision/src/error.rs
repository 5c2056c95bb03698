use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Per-request failures of the image-analysis service.
///
/// None of these are retried; each one ends the request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VisionError {
    /// The service refused the image (invalid-argument class).
    #[error("invalid image format or image too large: {0}")]
    ImageRejected(String),
    /// Resource-exhausted class.
    #[error("vision API request quota exceeded: {0}")]
    QuotaExceeded(String),
    /// Unavailable class.
    #[error("vision API not available: {0}")]
    ServiceUnavailable(String),
    /// Everything else, including transport failures and unreadable responses.
    #[error("failed to analyze image with vision API: {0}")]
    AnalysisFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    InvalidArgument,
    ResourceExhausted,
    Unavailable,
    Other,
}

impl StatusClass {
    fn from_status_name(name: &str) -> Self {
        match name {
            "INVALID_ARGUMENT" => StatusClass::InvalidArgument,
            "RESOURCE_EXHAUSTED" => StatusClass::ResourceExhausted,
            "UNAVAILABLE" => StatusClass::Unavailable,
            _ => StatusClass::Other,
        }
    }

    fn from_rpc_code(code: i64) -> Self {
        match code {
            3 => StatusClass::InvalidArgument,
            8 => StatusClass::ResourceExhausted,
            14 => StatusClass::Unavailable,
            _ => StatusClass::Other,
        }
    }

    fn from_http_status(status: u16) -> Self {
        match status {
            400 => StatusClass::InvalidArgument,
            429 => StatusClass::ResourceExhausted,
            503 => StatusClass::Unavailable,
            _ => StatusClass::Other,
        }
    }

    fn into_error(self, message: String) -> VisionError {
        match self {
            StatusClass::InvalidArgument => VisionError::ImageRejected(message),
            StatusClass::ResourceExhausted => VisionError::QuotaExceeded(message),
            StatusClass::Unavailable => VisionError::ServiceUnavailable(message),
            StatusClass::Other => VisionError::AnalysisFailed(message),
        }
    }
}

impl VisionError {
    /// Classifies a per-image status carried inside a successful HTTP response.
    /// The status name wins over the numeric RPC code when both are present.
    pub fn from_rpc_status(status: Option<&str>, code: Option<i64>, message: String) -> Self {
        let class = match (status, code) {
            (Some(name), _) => StatusClass::from_status_name(name),
            (None, Some(code)) => StatusClass::from_rpc_code(code),
            (None, None) => StatusClass::Other,
        };
        class.into_error(message)
    }

    /// Classifies a non-2xx HTTP response. The status name from the error body
    /// wins over the HTTP status code when present.
    pub fn from_http_status(http_status: u16, status: Option<&str>, message: String) -> Self {
        let class = match status {
            Some(name) => StatusClass::from_status_name(name),
            None => StatusClass::from_http_status(http_status),
        };
        class.into_error(message)
    }

    /// Short identifier for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            VisionError::ImageRejected(_) => "image_rejected",
            VisionError::QuotaExceeded(_) => "quota_exceeded",
            VisionError::ServiceUnavailable(_) => "service_unavailable",
            VisionError::AnalysisFailed(_) => "analysis_failed",
        }
    }
}

/// Startup-time failures while building the vision client.
#[derive(Debug, Error)]
pub enum VisionInitError {
    #[error("credentials file not found at {path}: {source}")]
    CredentialsFileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid credentials format: {0}")]
    InvalidCredentials(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
    #[error("invalid vision config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_status_names_map_to_classes() {
        let err = VisionError::from_rpc_status(Some("INVALID_ARGUMENT"), Some(3), "bad".into());
        assert_eq!(err, VisionError::ImageRejected("bad".into()));

        let err = VisionError::from_rpc_status(Some("RESOURCE_EXHAUSTED"), None, "quota".into());
        assert_eq!(err, VisionError::QuotaExceeded("quota".into()));

        let err = VisionError::from_rpc_status(Some("UNAVAILABLE"), None, "down".into());
        assert_eq!(err, VisionError::ServiceUnavailable("down".into()));

        let err = VisionError::from_rpc_status(Some("PERMISSION_DENIED"), Some(7), "no".into());
        assert_eq!(err, VisionError::AnalysisFailed("no".into()));
    }

    #[test]
    fn rpc_codes_used_without_status_name() {
        assert_eq!(
            VisionError::from_rpc_status(None, Some(3), "x".into()).kind(),
            "image_rejected"
        );
        assert_eq!(
            VisionError::from_rpc_status(None, Some(8), "x".into()).kind(),
            "quota_exceeded"
        );
        assert_eq!(
            VisionError::from_rpc_status(None, Some(14), "x".into()).kind(),
            "service_unavailable"
        );
        assert_eq!(
            VisionError::from_rpc_status(None, Some(13), "x".into()).kind(),
            "analysis_failed"
        );
        assert_eq!(
            VisionError::from_rpc_status(None, None, "x".into()).kind(),
            "analysis_failed"
        );
    }

    #[test]
    fn http_status_fallback() {
        assert_eq!(
            VisionError::from_http_status(429, None, "slow down".into()),
            VisionError::QuotaExceeded("slow down".into())
        );
        assert_eq!(
            VisionError::from_http_status(503, None, "x".into()).kind(),
            "service_unavailable"
        );
        assert_eq!(
            VisionError::from_http_status(400, None, "x".into()).kind(),
            "image_rejected"
        );
        assert_eq!(
            VisionError::from_http_status(500, None, "x".into()).kind(),
            "analysis_failed"
        );
        // Body status name beats the HTTP code.
        assert_eq!(
            VisionError::from_http_status(403, Some("RESOURCE_EXHAUSTED"), "x".into()).kind(),
            "quota_exceeded"
        );
    }

    #[test]
    fn quota_is_distinct_from_generic_failure() {
        let quota = VisionError::QuotaExceeded("daily limit".into());
        assert_ne!(quota.kind(), VisionError::AnalysisFailed("x".into()).kind());
        assert!(quota.to_string().contains("quota exceeded"));
    }

    #[test]
    fn init_error_messages() {
        let err = VisionInitError::CredentialsFileNotFound {
            path: PathBuf::from("/secrets/vision.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/secrets/vision.json"));
        assert!(VisionInitError::InvalidCredentials("bad pem".into())
            .to_string()
            .contains("bad pem"));
    }
}
