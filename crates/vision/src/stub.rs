//! Canned annotator for tests and offline runs.
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use preprocess::NormalizedImage;

use crate::error::VisionError;
use crate::types::{Feature, RawAnnotation};
use crate::ImageAnnotator;

/// Returns fixed results per feature and counts how often it was asked.
#[derive(Debug)]
pub struct StubAnnotator {
    labels: Result<Vec<RawAnnotation>, VisionError>,
    web_entities: Result<Vec<RawAnnotation>, VisionError>,
    calls: AtomicUsize,
}

impl StubAnnotator {
    pub fn new(labels: Vec<RawAnnotation>, web_entities: Vec<RawAnnotation>) -> Self {
        Self {
            labels: Ok(labels),
            web_entities: Ok(web_entities),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Both features fail with `err`.
    pub fn failing(err: VisionError) -> Self {
        Self {
            labels: Err(err.clone()),
            web_entities: Err(err),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_label_error(mut self, err: VisionError) -> Self {
        self.labels = Err(err);
        self
    }

    pub fn with_web_error(mut self, err: VisionError) -> Self {
        self.web_entities = Err(err);
        self
    }

    /// Number of `annotate` calls so far, across both features.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageAnnotator for StubAnnotator {
    async fn annotate(
        &self,
        _image: &NormalizedImage,
        feature: Feature,
    ) -> Result<Vec<RawAnnotation>, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match feature {
            Feature::LabelDetection => self.labels.clone(),
            Feature::WebDetection => self.web_entities.clone(),
        }
    }
}
