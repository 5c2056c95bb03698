//! HTTP client for the Messages API.
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::CaptionConfig;
use crate::error::{CaptionError, CaptionInitError};
use crate::types::{ContentBlock, GenerationRequest};
use crate::TextGenerator;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

/// Text generator backed by the Anthropic Messages API.
pub struct AnthropicClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl AnthropicClient {
    pub fn new(cfg: &CaptionConfig) -> Result<Self, CaptionInitError> {
        cfg.validate()?;
        let api_key = cfg.resolve_api_key()?;
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .connect_timeout(cfg.connect_timeout())
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| CaptionInitError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            url: format!("{}/v1/messages", cfg.endpoint.trim_end_matches('/')),
            api_key,
        })
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<ContentBlock>, CaptionError> {
        let payload = json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "system": request.system,
            "messages": [{ "role": "user", "content": request.prompt }],
        });

        let response = self
            .http
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CaptionError::GenerationFailed(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CaptionError::GenerationFailed(format!(
                "HTTP error {status}: {body}"
            )));
        }

        let message: MessagesResponse = response
            .json()
            .await
            .map_err(|e| CaptionError::GenerationFailed(format!("Invalid JSON response: {e}")))?;
        debug!(
            blocks = message.content.len(),
            stop_reason = ?message.stop_reason,
            "caption_generate_ok"
        );
        Ok(message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> AnthropicClient {
        AnthropicClient::new(&CaptionConfig {
            endpoint: server.base_url(),
            api_key: Some("sk-test".into()),
            ..Default::default()
        })
        .unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            model: "claude-3-5-sonnet-20240620".into(),
            system: "be brief".into(),
            prompt: "caption this".into(),
            max_tokens: 1000,
        }
    }

    #[tokio::test]
    async fn sends_messages_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/messages")
                    .header("x-api-key", "sk-test")
                    .header("anthropic-version", "2023-06-01")
                    .json_body(json!({
                        "model": "claude-3-5-sonnet-20240620",
                        "max_tokens": 1000,
                        "system": "be brief",
                        "messages": [{"role": "user", "content": "caption this"}]
                    }));
                then.status(200).json_body(json!({
                    "id": "msg_01",
                    "type": "message",
                    "role": "assistant",
                    "content": [{"type": "text", "text": "{\"caption\":\"hi\",\"hashtags\":[\"#a\"]}"}],
                    "stop_reason": "end_turn"
                }));
            })
            .await;

        let blocks = client(&server).generate(&request()).await.unwrap();
        mock.assert_async().await;
        assert_eq!(
            blocks,
            vec![ContentBlock::text("{\"caption\":\"hi\",\"hashtags\":[\"#a\"]}")]
        );
    }

    #[tokio::test]
    async fn non_success_status_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/messages");
                then.status(529)
                    .json_body(json!({"type": "error", "error": {"type": "overloaded_error"}}));
            })
            .await;
        let err = client(&server).generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("529"));
    }

    #[tokio::test]
    async fn unreadable_envelope_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/messages");
                then.status(200).body("not json");
            })
            .await;
        assert!(client(&server).generate(&request()).await.is_err());
    }

    #[test]
    fn missing_key_is_startup_error() {
        let cfg = CaptionConfig {
            api_key: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(
            AnthropicClient::new(&cfg).unwrap_err(),
            CaptionInitError::MissingApiKey
        );
    }
}
