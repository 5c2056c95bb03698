//! Downsampling and JPEG re-encoding.
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::config::PreprocessConfig;
use crate::error::DecodeError;
use crate::types::{NormalizedImage, RawImage};

/// Re-encodes `raw` as JPEG, scaled to fit inside the configured bounds.
///
/// The source format is sniffed from the bytes; the declared data URL
/// subtype is informational only. Aspect ratio is preserved and smaller
/// images are never upscaled. Alpha is dropped since JPEG cannot carry it.
pub fn normalize(raw: &RawImage, cfg: &PreprocessConfig) -> Result<NormalizedImage, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let decoded = image::load_from_memory(&raw.bytes)
        .map_err(|err| DecodeError::UnsupportedImage(err.to_string()))?;

    let fitted = if decoded.width() > cfg.max_width || decoded.height() > cfg.max_height {
        decoded.resize(cfg.max_width, cfg.max_height, FilterType::Lanczos3)
    } else {
        decoded
    };
    let rgb = DynamicImage::ImageRgb8(fitted.to_rgb8());

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, cfg.jpeg_quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| DecodeError::Encode(err.to_string()))?;

    Ok(NormalizedImage::new(
        bytes,
        rgb.width(),
        rgb.height(),
        cfg.jpeg_quality,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 251) as u8, (y % 241) as u8, 90, 200])
        });
        let img = if format == ImageFormat::Png {
            DynamicImage::ImageRgba8(img)
        } else {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8())
        };
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn raw(bytes: Vec<u8>) -> RawImage {
        RawImage {
            bytes,
            declared_format: None,
        }
    }

    #[test]
    fn large_landscape_fits_inside_bounds() {
        let out = normalize(
            &raw(encoded(1600, 900, ImageFormat::Png)),
            &PreprocessConfig::default(),
        )
        .unwrap();
        assert_eq!(out.width(), 800);
        assert_eq!(out.height(), 450);
        assert_eq!(
            image::guess_format(out.bytes()).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn large_portrait_fits_inside_bounds() {
        let out = normalize(
            &raw(encoded(600, 1200, ImageFormat::Png)),
            &PreprocessConfig::default(),
        )
        .unwrap();
        assert_eq!(out.height(), 800);
        assert_eq!(out.width(), 400);
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let out = normalize(
            &raw(encoded(64, 48, ImageFormat::Png)),
            &PreprocessConfig::default(),
        )
        .unwrap();
        assert_eq!((out.width(), out.height()), (64, 48));
    }

    #[test]
    fn output_is_always_jpeg_at_configured_quality() {
        let cfg = PreprocessConfig {
            jpeg_quality: 55,
            ..Default::default()
        };
        for format in [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Bmp] {
            let out = normalize(&raw(encoded(32, 32, format)), &cfg).unwrap();
            assert_eq!(
                image::guess_format(out.bytes()).unwrap(),
                ImageFormat::Jpeg
            );
            assert_eq!(out.quality(), 55);
            assert_eq!(out.mime_type(), "image/jpeg");
        }
    }

    #[test]
    fn custom_bounds_respected() {
        let cfg = PreprocessConfig {
            max_width: 100,
            max_height: 100,
            ..Default::default()
        };
        let out = normalize(&raw(encoded(300, 200, ImageFormat::Png)), &cfg).unwrap();
        assert!(out.width() <= 100 && out.height() <= 100);
        assert_eq!(out.width(), 100);
    }

    #[test]
    fn corrupt_bytes_rejected() {
        let err = normalize(
            &raw(b"definitely not an image".to_vec()),
            &PreprocessConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedImage(_)));
    }

    #[test]
    fn empty_bytes_rejected() {
        let err = normalize(&raw(Vec::new()), &PreprocessConfig::default()).unwrap_err();
        assert_eq!(err, DecodeError::EmptyPayload);
    }
}
