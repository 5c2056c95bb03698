//! YAML configuration for the caption pipeline.
//!
//! All three stages are configured from a single file; every section and
//! every field is optional and falls back to the production defaults.
//! Secrets are not expected in the file: when `vision.auth` or
//! `caption.api_key` are absent they are read from the environment once,
//! when [`PipelineConfig::build_pipeline`] runs.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # PetPortrait pipeline configuration
//! version: "1.0"
//!
//! preprocess:
//!   max_width: 800
//!   max_height: 800
//!   jpeg_quality: 80
//!   max_decoded_bytes: 10485760
//!
//! vision:
//!   endpoint: "https://vision.googleapis.com"
//!   timeout_secs: 30
//!   max_results: 10
//!   auth:
//!     kind: service_account_file
//!     path: "/etc/petportrait/vision-key.json"
//!
//! caption:
//!   endpoint: "https://api.anthropic.com"
//!   model: "claude-3-5-sonnet-20240620"
//!   max_tokens: 1000
//! ```

use std::fs;
use std::path::Path;

use caption::{CaptionConfig, CaptionSynthesizer};
use preprocess::PreprocessConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use vision::{VisionAnalyzer, VisionConfig};

use crate::{CaptionPipeline, InitError};

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub preprocess: PreprocessConfig,

    #[serde(default)]
    pub vision: VisionConfig,

    #[serde(default)]
    pub caption: CaptionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            preprocess: PreprocessConfig::default(),
            vision: VisionConfig::default(),
            caption: CaptionConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.preprocess
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("preprocess: {e}")))?;
        self.vision
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("vision: {e}")))?;
        self.caption
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("caption: {e}")))?;
        Ok(())
    }

    /// Resolves credentials and builds both remote clients.
    pub fn build_pipeline(&self) -> Result<CaptionPipeline, InitError> {
        self.validate()?;
        let analyzer = VisionAnalyzer::from_config(&self.vision)?;
        let synthesizer = CaptionSynthesizer::from_config(&self.caption)?;
        info!(
            name = self.name.as_deref().unwrap_or("default"),
            model = %self.caption.model,
            max_width = self.preprocess.max_width,
            max_height = self.preprocess.max_height,
            "caption pipeline ready"
        );
        Ok(CaptionPipeline::new(
            self.preprocess.clone(),
            analyzer,
            synthesizer,
        ))
    }
}

fn default_version() -> String {
    "1.0".to_string()
}
