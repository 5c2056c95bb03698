//! PetPortrait Caption Synthesizer
//!
//! Last stage of the caption pipeline. Turns the label and web-entity
//! descriptions from a [`VisionSignal`] into a prompt, asks a text-generation
//! model for an Instagram caption plus hashtags, and parses the JSON reply.
//!
//! A reply that cannot be used (no text, malformed JSON, missing or empty
//! fields) is not an error: the synthesizer returns
//! [`CaptionResult::fallback`] instead. Only a failed call to the model
//! surfaces as [`CaptionError`].
//!
//! The model sits behind [`TextGenerator`]; production uses
//! [`AnthropicClient`], tests use [`stub::StubGenerator`].
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use vision::VisionSignal;

mod api;
mod config;
mod error;
mod prompt;
pub mod stub;
mod types;

pub use crate::api::AnthropicClient;
pub use crate::config::{CaptionConfig, API_KEY_ENV};
pub use crate::error::{CaptionError, CaptionInitError};
pub use crate::prompt::{build_prompt, concepts, SYSTEM_INSTRUCTION};
pub use crate::types::{CaptionResult, ContentBlock, GenerationRequest};

/// A model that answers a single-turn prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<ContentBlock>, CaptionError>;
}

/// Strict shape of the model's JSON reply.
#[derive(Deserialize)]
struct ModelReply {
    caption: String,
    hashtags: Vec<String>,
}

#[derive(Clone)]
pub struct CaptionSynthesizer {
    generator: Arc<dyn TextGenerator>,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for CaptionSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionSynthesizer")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl CaptionSynthesizer {
    /// Uses the model name and token budget from `cfg` with any generator.
    pub fn new(generator: Arc<dyn TextGenerator>, cfg: &CaptionConfig) -> Self {
        Self {
            generator,
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
        }
    }

    pub fn from_config(cfg: &CaptionConfig) -> Result<Self, CaptionInitError> {
        Ok(Self::new(Arc::new(AnthropicClient::new(cfg)?), cfg))
    }

    pub fn request_for(&self, signal: &VisionSignal) -> GenerationRequest {
        GenerationRequest {
            model: self.model.clone(),
            system: SYSTEM_INSTRUCTION.to_string(),
            prompt: build_prompt(signal),
            max_tokens: self.max_tokens,
        }
    }

    /// Generates a caption for the detected concepts.
    ///
    /// Exactly one model call. Errors only when that call fails.
    pub async fn synthesize(&self, signal: &VisionSignal) -> Result<CaptionResult, CaptionError> {
        let start = Instant::now();
        let request = self.request_for(signal);

        let blocks = self.generator.generate(&request).await.map_err(|err| {
            warn!(error = %err, "caption_generate_failure");
            err
        })?;

        let result = match parse_reply(&blocks) {
            Ok(result) => result,
            Err(reason) => {
                warn!(reason = %reason, "caption_reply_fallback");
                CaptionResult::fallback()
            }
        };
        debug!(
            hashtags = result.hashtags.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "caption_synthesize_success"
        );
        Ok(result)
    }
}

/// Pulls the caption out of the first content block.
fn parse_reply(blocks: &[ContentBlock]) -> Result<CaptionResult, String> {
    let text = match blocks.first() {
        Some(ContentBlock::Text { text }) => text,
        Some(ContentBlock::Other) => return Err("first content block is not text".into()),
        None => return Err("reply has no content".into()),
    };

    let reply: ModelReply =
        serde_json::from_str(text.trim()).map_err(|e| format!("reply is not caption JSON: {e}"))?;
    if reply.caption.trim().is_empty() {
        return Err("caption is empty".into());
    }
    if reply.hashtags.is_empty() {
        return Err("hashtags are empty".into());
    }
    Ok(CaptionResult {
        caption: reply.caption,
        hashtags: reply.hashtags,
    })
}
