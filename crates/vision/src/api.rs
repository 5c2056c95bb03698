//! HTTP client for the `images:annotate` endpoint.
use async_trait::async_trait;
use preprocess::NormalizedImage;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::VisionConfig;
use crate::credentials::Credentials;
use crate::error::{VisionError, VisionInitError};
use crate::types::{Feature, RawAnnotation};
use crate::ImageAnnotator;

#[derive(Debug, Default, Deserialize)]
struct AnnotateBatchResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<RawAnnotation>,
    #[serde(default)]
    web_detection: Option<WebDetection>,
    #[serde(default)]
    error: Option<RpcStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebDetection {
    #[serde(default)]
    web_entities: Vec<RawAnnotation>,
}

#[derive(Debug, Default, Deserialize)]
struct RpcStatus {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HttpErrorBody {
    error: RpcStatus,
}

/// Annotator backed by the Google Cloud Vision REST API.
#[derive(Debug)]
pub struct GoogleVisionClient {
    http: reqwest::Client,
    url: String,
    credentials: Credentials,
    max_results: Option<u32>,
}

impl GoogleVisionClient {
    /// Builds the HTTP client and resolves credentials. Fails at startup,
    /// never per request.
    pub fn new(cfg: &VisionConfig) -> Result<Self, VisionInitError> {
        cfg.validate()?;
        let credentials = Credentials::resolve(&cfg.resolved_auth())?;
        Self::with_credentials(cfg, credentials)
    }

    pub fn with_credentials(
        cfg: &VisionConfig,
        credentials: Credentials,
    ) -> Result<Self, VisionInitError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .connect_timeout(cfg.connect_timeout())
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| VisionInitError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            url: format!("{}/v1/images:annotate", cfg.endpoint.trim_end_matches('/')),
            credentials,
            max_results: cfg.max_results,
        })
    }

    fn build_payload(&self, image: &NormalizedImage, feature: Feature) -> Value {
        let mut feature_spec = json!({ "type": feature.as_api_str() });
        if let Some(max) = self.max_results {
            feature_spec["maxResults"] = json!(max);
        }
        json!({
            "requests": [{
                "image": { "content": image.to_base64() },
                "features": [feature_spec],
            }]
        })
    }
}

#[async_trait]
impl ImageAnnotator for GoogleVisionClient {
    async fn annotate(
        &self,
        image: &NormalizedImage,
        feature: Feature,
    ) -> Result<Vec<RawAnnotation>, VisionError> {
        let payload = self.build_payload(image, feature);
        let request = self.credentials.authorize(&self.http, self.http.post(&self.url)).await?;

        let response = request
            .json(&payload)
            .send()
            .await
            .map_err(|e| VisionError::AnalysisFailed(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_error(status.as_u16(), &body));
        }

        let batch: AnnotateBatchResponse = response
            .json()
            .await
            .map_err(|e| VisionError::AnalysisFailed(format!("Invalid JSON response: {e}")))?;

        let Some(first) = batch.responses.into_iter().next() else {
            return Ok(Vec::new());
        };
        if let Some(err) = first.error {
            return Err(VisionError::from_rpc_status(
                err.status.as_deref(),
                err.code,
                err.message.unwrap_or_default(),
            ));
        }

        let annotations = match feature {
            Feature::LabelDetection => first.label_annotations,
            Feature::WebDetection => first
                .web_detection
                .map(|web| web.web_entities)
                .unwrap_or_default(),
        };
        debug!(feature = %feature, count = annotations.len(), "vision_annotate_ok");
        Ok(annotations)
    }
}

fn classify_http_error(http_status: u16, body: &str) -> VisionError {
    match serde_json::from_str::<HttpErrorBody>(body) {
        Ok(HttpErrorBody { error }) => VisionError::from_http_status(
            http_status,
            error.status.as_deref(),
            error
                .message
                .unwrap_or_else(|| format!("HTTP error {http_status}")),
        ),
        Err(_) => VisionError::from_http_status(
            http_status,
            None,
            format!("HTTP error {http_status}: {body}"),
        ),
    }
}
