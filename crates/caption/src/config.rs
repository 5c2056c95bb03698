use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CaptionInitError;

pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Settings for the text-generation service.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptionConfig {
    /// Base URL; `/v1/messages` is appended.
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Falls back to `ANTHROPIC_API_KEY` when unset.
    pub api_key: Option<String>,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com".into(),
            model: "claude-3-5-sonnet-20240620".into(),
            max_tokens: 1000,
            timeout_secs: 60,
            connect_timeout_secs: 10,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for CaptionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CaptionConfig {
    pub fn validate(&self) -> Result<(), CaptionInitError> {
        if self.endpoint.trim().is_empty() {
            return Err(CaptionInitError::InvalidConfig("endpoint must not be empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(CaptionInitError::InvalidConfig("model must not be empty".into()));
        }
        if self.max_tokens == 0 {
            return Err(CaptionInitError::InvalidConfig(
                "max_tokens must be greater than zero".into(),
            ));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(CaptionInitError::InvalidConfig(
                "timeouts must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Configured key, else the environment's. Blank values count as missing.
    pub fn resolve_api_key(&self) -> Result<String, CaptionInitError> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(CaptionInitError::MissingApiKey)
    }
}
