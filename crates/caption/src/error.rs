use thiserror::Error;

/// Failure to get any response out of the text-generation service.
///
/// Malformed model output is not an error; it produces the fallback caption.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptionError {
    #[error("failed to generate caption: {0}")]
    GenerationFailed(String),
}

/// Startup-time failures while building the generation client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptionInitError {
    #[error("missing API key: set ANTHROPIC_API_KEY or caption.api_key")]
    MissingApiKey,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
    #[error("invalid caption config: {0}")]
    InvalidConfig(String),
}
