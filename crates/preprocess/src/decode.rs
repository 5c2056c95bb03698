//! Base64 / data URL decoding.
//!
//! Clients send either a bare base64 string or a data URL such as
//! `data:image/png;base64,iVBORw0...`. The prefix is stripped with a pattern
//! match, whitespace is dropped, and the remainder is decoded. Padding is
//! optional and the URL-safe alphabet is accepted when the standard one
//! fails, since browsers and mobile SDKs disagree on both.
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PreprocessConfig;
use crate::error::DecodeError;
use crate::types::RawImage;

static DATA_URL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/([A-Za-z0-9.+-]+);base64,").expect("data URL pattern compiles")
});

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Splits a `data:image/<fmt>;base64,` prefix off `input`.
///
/// Returns the declared subtype (if a prefix was present) and the remaining
/// payload. Input without a prefix is returned unchanged.
///
/// ```rust
/// use preprocess::strip_data_url_prefix;
///
/// assert_eq!(strip_data_url_prefix("data:image/png;base64,AAAA"), (Some("png"), "AAAA"));
/// assert_eq!(strip_data_url_prefix("AAAA"), (None, "AAAA"));
/// ```
pub fn strip_data_url_prefix(input: &str) -> (Option<&str>, &str) {
    match DATA_URL_PREFIX.captures(input) {
        Some(caps) => {
            let end = caps.get(0).map_or(0, |m| m.end());
            (caps.get(1).map(|m| m.as_str()), &input[end..])
        }
        None => (None, input),
    }
}

/// Decodes the inbound string into raw image bytes.
pub fn decode(input: &str, cfg: &PreprocessConfig) -> Result<RawImage, DecodeError> {
    let (declared_format, payload) = strip_data_url_prefix(input.trim());

    let cleaned: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let bytes = STANDARD_LENIENT
        .decode(&cleaned)
        .or_else(|err| URL_SAFE_LENIENT.decode(&cleaned).map_err(|_| err))
        .map_err(|err| DecodeError::InvalidBase64(err.to_string()))?;

    if bytes.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }
    if let Some(limit) = cfg.max_decoded_bytes {
        if bytes.len() > limit {
            return Err(DecodeError::PayloadTooLarge {
                actual: bytes.len(),
                limit,
            });
        }
    }

    Ok(RawImage {
        bytes,
        declared_format: declared_format.map(str::to_ascii_lowercase),
    })
}
