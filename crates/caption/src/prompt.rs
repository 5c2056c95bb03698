use vision::VisionSignal;

pub const SYSTEM_INSTRUCTION: &str = "You are a creative social media caption generator. You respond only with valid JSON containing caption and hashtags.";

/// Label descriptions followed by web-entity descriptions, in upstream order.
///
/// Nothing is deduplicated or filtered by score.
pub fn concepts(signal: &VisionSignal) -> Vec<&str> {
    signal
        .labels
        .iter()
        .chain(signal.web_entities.iter())
        .map(|annotation| annotation.description.as_str())
        .collect()
}

/// Renders the user prompt sent to the model.
pub fn build_prompt(signal: &VisionSignal) -> String {
    let detected = concepts(signal).join(", ");
    format!(
        r##"
You are an expert social media content creator specializing in pet photography.
I have a photo of a pet, and Google Vision API detected these elements: {detected}.

Please create:
1. A creative, engaging Instagram caption (1-2 sentences) for this pet photo
2. A list of 3-5 relevant hashtags that would help this post get discovered

Response must be in JSON format like this:
{{
  "caption": "Your creative caption here",
  "hashtags": ["#hashtag1", "#hashtag2", ...]
}}
"##
    )
}
