//! Error types produced by the preprocess crate.
//!
//! Every failure here is a property of the inbound photo, so all variants
//! are recoverable from the caller's point of view: the request is rejected
//! before any remote call is made.
//!
//! | Error | Cause |
//! |-------|-------|
//! | [`EmptyPayload`](DecodeError::EmptyPayload) | Nothing left after stripping the data URL prefix, or zero decoded bytes |
//! | [`InvalidBase64`](DecodeError::InvalidBase64) | Payload is not base64 |
//! | [`PayloadTooLarge`](DecodeError::PayloadTooLarge) | Decoded bytes exceed `max_decoded_bytes` |
//! | [`UnsupportedImage`](DecodeError::UnsupportedImage) | Bytes are not a raster format we can read |
//! | [`Encode`](DecodeError::Encode) | JPEG re-encoding failed |
use thiserror::Error;

/// Errors surfaced while decoding and normalizing an inbound photo.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("image payload is empty")]
    EmptyPayload,

    #[error("image payload is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("image payload of {actual} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { actual: usize, limit: usize },

    /// Corrupt data or a format the decoder was not built with.
    #[error("unsupported or corrupt image data: {0}")]
    UnsupportedImage(String),

    #[error("failed to re-encode image: {0}")]
    Encode(String),
}
