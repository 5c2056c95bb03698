use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static FALLBACK: Lazy<CaptionResult> = Lazy::new(|| CaptionResult {
    caption: "Enjoying precious moments with my adorable pet! ❤️🐾".into(),
    hashtags: [
        "#petlife",
        "#cutepet",
        "#petlover",
        "#petstagram",
        "#animallovers",
    ]
    .map(String::from)
    .to_vec(),
});

/// Final output of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionResult {
    pub caption: String,
    pub hashtags: Vec<String>,
}

impl CaptionResult {
    /// Generic caption used whenever the model's reply cannot be used.
    pub fn fallback() -> Self {
        FALLBACK.clone()
    }
}

/// What the synthesizer asks the text-generation service for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// One block of a model reply. Only text blocks carry a caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_fixed() {
        let fallback = CaptionResult::fallback();
        assert_eq!(
            fallback.caption,
            "Enjoying precious moments with my adorable pet! ❤️🐾"
        );
        assert_eq!(
            fallback.hashtags,
            ["#petlife", "#cutepet", "#petlover", "#petstagram", "#animallovers"]
        );
    }

    #[test]
    fn content_blocks_deserialize() {
        let blocks: Vec<ContentBlock> = serde_json::from_str(
            r#"[{"type": "text", "text": "hi"}, {"type": "tool_use", "id": "x", "name": "y", "input": {}}]"#,
        )
        .unwrap();
        assert_eq!(blocks, vec![ContentBlock::text("hi"), ContentBlock::Other]);
    }
}
