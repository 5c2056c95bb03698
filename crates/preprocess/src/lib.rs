//! PetPortrait Image Preprocessor
//!
//! First stage of the caption pipeline. Clients upload photos as base64,
//! sometimes wrapped in a `data:image/<fmt>;base64,` URL, in whatever format
//! and size the phone produced. This crate turns that into a bounded JPEG
//! before anything leaves the process:
//!
//! - **Decode** - strip the data URL prefix, decode base64, reject empty or
//!   oversized payloads ([`decode`])
//! - **Normalize** - scale to fit inside 800×800 (configurable, never
//!   upscaled) and re-encode as JPEG at quality 80 ([`normalize`])
//!
//! Both steps are CPU-only: no disk writes, no network. Callers running on
//! an async runtime should hand [`preprocess`] to a blocking thread.
//!
//! ```rust
//! use preprocess::{preprocess, DecodeError, PreprocessConfig};
//!
//! let err = preprocess("data:image/png;base64,", &PreprocessConfig::default()).unwrap_err();
//! assert_eq!(err, DecodeError::EmptyPayload);
//! ```
use std::time::Instant;

use tracing::{debug, warn};

mod config;
mod decode;
mod error;
mod transcode;
mod types;

pub use crate::config::{ConfigError, PreprocessConfig};
pub use crate::decode::{decode, strip_data_url_prefix};
pub use crate::error::DecodeError;
pub use crate::transcode::normalize;
pub use crate::types::{NormalizedImage, RawImage};

/// Decodes and normalizes an inbound photo in one step.
pub fn preprocess(input: &str, cfg: &PreprocessConfig) -> Result<NormalizedImage, DecodeError> {
    let start = Instant::now();

    let result = decode(input, cfg).and_then(|raw| {
        debug!(
            decoded_bytes = raw.len(),
            declared_format = ?raw.declared_format,
            "preprocess_decoded"
        );
        normalize(&raw, cfg)
    });

    let elapsed_micros = start.elapsed().as_micros();
    match &result {
        Ok(image) => debug!(
            width = image.width(),
            height = image.height(),
            encoded_bytes = image.len(),
            elapsed_micros,
            "preprocess_success"
        ),
        Err(err) => warn!(error = %err, elapsed_micros, "preprocess_failure"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_base64(width: u32, height: u32) -> String {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 3 % 256) as u8, (y * 7 % 256) as u8, 17])
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        STANDARD.encode(out.into_inner())
    }

    #[test]
    fn data_url_photo_is_bounded_jpeg() {
        let input = format!("data:image/png;base64,{}", png_base64(1024, 2048));
        let image = preprocess(&input, &PreprocessConfig::default()).unwrap();
        assert!(image.width() <= 800 && image.height() <= 800);
        assert_eq!(image.height(), 800);
        assert_eq!(
            image::guess_format(image.bytes()).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn bare_base64_photo_accepted() {
        let image = preprocess(&png_base64(20, 10), &PreprocessConfig::default()).unwrap();
        assert_eq!((image.width(), image.height()), (20, 10));
        assert!(!image.to_base64().is_empty());
    }

    #[test]
    fn base64_of_non_image_rejected() {
        let input = STANDARD.encode(b"{\"not\": \"an image\"}");
        let err = preprocess(&input, &PreprocessConfig::default()).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedImage(_)));
    }

    #[test]
    fn same_input_same_output() {
        let input = png_base64(900, 300);
        let cfg = PreprocessConfig::default();
        assert_eq!(
            preprocess(&input, &cfg).unwrap(),
            preprocess(&input, &cfg).unwrap()
        );
    }
}
