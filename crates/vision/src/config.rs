use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::credentials::VisionAuth;
use crate::error::VisionInitError;

/// Connection settings for the image-analysis service.
///
/// Loaded from the `vision` section of the pipeline YAML. When `auth` is
/// absent the credential is read from the environment at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisionConfig {
    /// Base URL; `/v1/images:annotate` is appended.
    pub endpoint: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Upper bound on labels and entities per feature. Service default when unset.
    pub max_results: Option<u32>,
    pub auth: Option<VisionAuth>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com".into(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_results: None,
            auth: None,
        }
    }
}

impl VisionConfig {
    pub fn validate(&self) -> Result<(), VisionInitError> {
        if self.endpoint.trim().is_empty() {
            return Err(VisionInitError::InvalidConfig("endpoint must not be empty".into()));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(VisionInitError::InvalidConfig(
                "timeouts must be greater than zero".into(),
            ));
        }
        if self.max_results == Some(0) {
            return Err(VisionInitError::InvalidConfig(
                "max_results must be greater than zero when set".into(),
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

    /// Configured credential, or the environment's when none is set.
    pub fn resolved_auth(&self) -> VisionAuth {
        self.auth.clone().unwrap_or_else(VisionAuth::from_env)
    }
}
