//! PetPortrait Vision Analyzer
//!
//! Second stage of the caption pipeline. Sends a normalized photo to the
//! image-analysis service twice, once for label detection and once for web
//! detection, and merges the answers into a [`VisionSignal`].
//!
//! The remote service sits behind the [`ImageAnnotator`] trait so the
//! analyzer can run against [`GoogleVisionClient`] in production and
//! [`stub::StubAnnotator`] in tests.
//!
//! ```rust,no_run
//! use vision::{VisionAnalyzer, VisionConfig};
//!
//! # async fn run(image: preprocess::NormalizedImage) -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = VisionAnalyzer::from_config(&VisionConfig::default())?;
//! let signal = analyzer.analyze(&image).await?;
//! for label in &signal.labels {
//!     println!("{} ({:.2})", label.description, label.score);
//! }
//! # Ok(())
//! # }
//! ```
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use preprocess::NormalizedImage;
use tracing::{debug, warn};

mod api;
mod config;
mod credentials;
mod error;
pub mod stub;
mod types;

pub use crate::api::GoogleVisionClient;
pub use crate::config::VisionConfig;
pub use crate::credentials::{
    well_known_credentials_path, AuthorizedUserKey, Credentials, CredentialsFile,
    ServiceAccountKey, TokenSource, VisionAuth,
};
pub use crate::error::{VisionError, VisionInitError};
pub use crate::types::{Annotation, Feature, RawAnnotation, VisionSignal};

/// One detection feature against one image.
#[async_trait]
pub trait ImageAnnotator: Send + Sync {
    async fn annotate(
        &self,
        image: &NormalizedImage,
        feature: Feature,
    ) -> Result<Vec<RawAnnotation>, VisionError>;
}

/// Runs label and web detection for a photo.
#[derive(Clone)]
pub struct VisionAnalyzer {
    annotator: Arc<dyn ImageAnnotator>,
}

impl VisionAnalyzer {
    pub fn new(annotator: Arc<dyn ImageAnnotator>) -> Self {
        Self { annotator }
    }

    /// Builds an analyzer backed by the Cloud Vision REST API.
    pub fn from_config(cfg: &VisionConfig) -> Result<Self, VisionInitError> {
        Ok(Self::new(Arc::new(GoogleVisionClient::new(cfg)?)))
    }

    /// Issues both detections concurrently and waits for both to settle.
    ///
    /// If either fails the whole analysis fails; a label failure is reported
    /// in preference to a web failure. Empty results are not an error.
    pub async fn analyze(&self, image: &NormalizedImage) -> Result<VisionSignal, VisionError> {
        let start = Instant::now();
        let (labels, web_entities) = tokio::join!(
            self.annotator.annotate(image, Feature::LabelDetection),
            self.annotator.annotate(image, Feature::WebDetection),
        );

        let result = match (labels, web_entities) {
            (Ok(labels), Ok(web_entities)) => Ok(VisionSignal::from_raw(labels, web_entities)),
            (Err(err), _) | (Ok(_), Err(err)) => Err(err),
        };

        let elapsed_micros = start.elapsed().as_micros();
        match &result {
            Ok(signal) => debug!(
                labels = signal.labels.len(),
                web_entities = signal.web_entities.len(),
                elapsed_micros,
                "vision_analyze_success"
            ),
            Err(err) => warn!(
                error = %err,
                kind = err.kind(),
                elapsed_micros,
                "vision_analyze_failure"
            ),
        }
        result
    }
}

impl std::fmt::Debug for VisionAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionAnalyzer").finish_non_exhaustive()
    }
}
