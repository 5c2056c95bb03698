use std::fmt;

use serde::{Deserialize, Serialize};

/// Detection feature requested from the image-analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    LabelDetection,
    WebDetection,
}

impl Feature {
    /// Feature type string on the wire.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Feature::LabelDetection => "LABEL_DETECTION",
            Feature::WebDetection => "WEB_DETECTION",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// One label or web entity as the remote service reported it.
///
/// Both fields are optional upstream: labels without a description and
/// entities without a score show up in real responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAnnotation {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub score: Option<f32>,
}

impl RawAnnotation {
    pub fn new(description: impl Into<String>, score: f32) -> Self {
        Self {
            description: Some(description.into()),
            score: Some(score),
        }
    }
}

/// A label or web entity with absence already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub description: String,
    /// Confidence in `[0, 1]`; `0.0` when upstream omitted it.
    pub score: f32,
}

impl From<RawAnnotation> for Annotation {
    fn from(raw: RawAnnotation) -> Self {
        Self {
            description: raw.description.unwrap_or_default(),
            score: raw
                .score
                .filter(|s| s.is_finite())
                .map(|s| s.clamp(0.0, 1.0))
                .unwrap_or(0.0),
        }
    }
}

/// Everything the analyzer learned about one photo.
///
/// Upstream order is preserved in both sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionSignal {
    pub labels: Vec<Annotation>,
    pub web_entities: Vec<Annotation>,
}

impl VisionSignal {
    pub fn from_raw(labels: Vec<RawAnnotation>, web_entities: Vec<RawAnnotation>) -> Self {
        Self {
            labels: labels.into_iter().map(Annotation::from).collect(),
            web_entities: web_entities.into_iter().map(Annotation::from).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.web_entities.is_empty()
    }
}
