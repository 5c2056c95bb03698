//! Configuration for photo normalization.
//!
//! [`PreprocessConfig`] bounds what the pipeline sends to the remote image
//! analyzer: the maximum output dimensions, the JPEG quality factor, and an
//! optional cap on the decoded payload size. It is cheap to clone and
//! deserializes from the `preprocess` section of the pipeline YAML.
//!
//! ```rust
//! use preprocess::PreprocessConfig;
//!
//! let config = PreprocessConfig::default();
//! assert_eq!((config.max_width, config.max_height), (800, 800));
//! assert_eq!(config.jpeg_quality, 80);
//! config.validate().expect("defaults are valid");
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime configuration for [`preprocess`](crate::preprocess).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Images wider than this are scaled down to fit.
    pub max_width: u32,
    /// Images taller than this are scaled down to fit.
    pub max_height: u32,
    /// JPEG quality factor of the re-encoded output (1..=100).
    pub jpeg_quality: u8,
    /// Optional cap on the decoded payload size, in bytes.
    pub max_decoded_bytes: Option<usize>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 800,
            jpeg_quality: 80,
            max_decoded_bytes: None,
        }
    }
}

/// Configuration validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_width and max_height must be greater than zero")]
    ZeroBounds,
    #[error("jpeg_quality must be within 1..=100, got {0}")]
    InvalidQuality(u8),
    #[error("max_decoded_bytes must be greater than zero when set")]
    ZeroByteLimit,
}

impl PreprocessConfig {
    /// Checks the configuration for values the transcoder cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ConfigError::ZeroBounds);
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidQuality(self.jpeg_quality));
        }
        if self.max_decoded_bytes == Some(0) {
            return Err(ConfigError::ZeroByteLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = PreprocessConfig::default();
        assert_eq!(cfg.max_width, 800);
        assert_eq!(cfg.max_height, 800);
        assert_eq!(cfg.jpeg_quality, 80);
        assert!(cfg.max_decoded_bytes.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_bounds_rejected() {
        let cfg = PreprocessConfig {
            max_width: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBounds));
    }

    #[test]
    fn quality_out_of_range_rejected() {
        for quality in [0u8, 101, 255] {
            let cfg = PreprocessConfig {
                jpeg_quality: quality,
                ..Default::default()
            };
            assert_eq!(cfg.validate(), Err(ConfigError::InvalidQuality(quality)));
        }
    }

    #[test]
    fn zero_byte_limit_rejected() {
        let cfg = PreprocessConfig {
            max_decoded_bytes: Some(0),
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroByteLimit));
    }

    #[test]
    fn partial_section_fills_defaults() {
        let cfg: PreprocessConfig = serde_json::from_str(r#"{"jpeg_quality": 65}"#).unwrap();
        assert_eq!(cfg.jpeg_quality, 65);
        assert_eq!(cfg.max_width, 800);
        assert_eq!(cfg.max_height, 800);
    }
}
