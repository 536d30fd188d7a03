//! Generation request model and the `generateContent` wire types.
//!
//! [`GenerationRequest`] fully determines one call. The wire structs mirror the
//! JSON accepted and returned by Gemini (camelCase field names).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error_handler::{
    ConfigError, Result, validate_range_f32, validate_stop_sequences,
};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-001";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;
pub const DEFAULT_TOP_P: f32 = 0.8;
pub const DEFAULT_TOP_K: u32 = 40;

/// Harm categories covered by the safety policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    /// All four categories at `BLOCK_NONE`. Applied to every call.
    pub fn permissive_policy() -> Vec<SafetySetting> {
        [
            HarmCategory::HateSpeech,
            HarmCategory::DangerousContent,
            HarmCategory::Harassment,
            HarmCategory::SexuallyExplicit,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: HarmBlockThreshold::BlockNone,
        })
        .collect()
    }
}

/// One call to the generation client.
///
/// Safety settings are fixed to [`SafetySetting::permissive_policy`] and can
/// only be read.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model_id: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
    pub stop_sequences: Vec<String>,
    safety_settings: Vec<SafetySetting>,
    pub ground_in_search: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model_id: model_id.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            stop_sequences: Vec::new(),
            safety_settings: SafetySetting::permissive_policy(),
            ground_in_search: false,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_stop_sequences(mut self, stops: Vec<String>) -> Self {
        self.stop_sequences = stops;
        self
    }

    /// Attaches the web-search grounding tool.
    pub fn grounded(mut self, on: bool) -> Self {
        self.ground_in_search = on;
        self
    }

    pub fn safety_settings(&self) -> &[SafetySetting] {
        &self.safety_settings
    }

    /// Rejects values the backend would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_range_f32("temperature", self.temperature, 0.0, 2.0, "expected 0.0..=2.0")?;
        validate_range_f32("top_p", self.top_p, 0.0, 1.0, "expected 0.0..=1.0")?;
        if self.max_output_tokens == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_output_tokens",
                detail: "expected at least 1",
            }
            .into());
        }
        validate_stop_sequences(&self.stop_sequences)
    }

    /// Builds the `generateContent` body for this request.
    pub(crate) fn to_body(&self) -> GenerateContentBody<'_> {
        let tools = if self.ground_in_search {
            vec![Tool {
                google_search_retrieval: GoogleSearchRetrieval {},
            }]
        } else {
            Vec::new()
        };

        GenerateContentBody {
            contents: vec![Content::user(&self.prompt)],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                top_p: self.top_p,
                top_k: self.top_k,
                candidate_count: 1,
                max_output_tokens: self.max_output_tokens,
                stop_sequences: &self.stop_sequences,
            },
            safety_settings: &self.safety_settings,
            tools,
        }
    }
}

/* ----------------------------- request wire ----------------------------- */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentBody<'a> {
    contents: Vec<Content>,
    generation_config: GenerationConfig<'a>,
    safety_settings: &'a [SafetySetting],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    candidate_count: u32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop_sequences: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search_retrieval: GoogleSearchRetrieval,
}

#[derive(Debug, Serialize)]
struct GoogleSearchRetrieval {}

/* ---------------------------- shared content ---------------------------- */

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/* ---------------------------- response wire ----------------------------- */

/// Full `generateContent` response, returned as-is in raw mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_ratings: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<Value>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first part, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_follow_known_settings() {
        let r = GenerationRequest::new("hi", DEFAULT_GEMINI_MODEL);
        assert_eq!(r.temperature, 0.5);
        assert_eq!(r.max_output_tokens, 1024);
        assert_eq!(r.top_p, 0.8);
        assert_eq!(r.top_k, 40);
        assert!(!r.ground_in_search);
        assert_eq!(r.safety_settings().len(), 4);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn body_carries_permissive_safety_and_single_candidate() {
        let r = GenerationRequest::new("hello", "m");
        let v = serde_json::to_value(r.to_body()).unwrap();

        assert_eq!(v["contents"][0]["role"], "user");
        assert_eq!(v["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(v["generationConfig"]["candidateCount"], 1);
        assert_eq!(v["generationConfig"]["maxOutputTokens"], 1024);
        assert_eq!(v["generationConfig"]["topK"], 40);
        assert!(v["generationConfig"].get("stopSequences").is_none());
        assert!(v.get("tools").is_none());

        let safety = v["safetySettings"].as_array().unwrap();
        assert_eq!(safety.len(), 4);
        assert!(safety.iter().all(|s| s["threshold"] == "BLOCK_NONE"));
        assert_eq!(safety[0]["category"], "HARM_CATEGORY_HATE_SPEECH");
    }

    #[test]
    fn grounding_adds_search_tool() {
        let r = GenerationRequest::new("news?", "m")
            .grounded(true)
            .with_stop_sequences(vec!["END".into()]);
        let v = serde_json::to_value(r.to_body()).unwrap();
        assert_eq!(v["tools"], json!([{ "googleSearchRetrieval": {} }]));
        assert_eq!(v["generationConfig"]["stopSequences"], json!(["END"]));
    }

    #[test]
    fn first_text_takes_first_candidate_first_part() {
        let raw: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "one" }, { "text": "two" }] },
                  "finishReason": "STOP" },
                { "content": { "parts": [{ "text": "other" }] } }
            ],
            "usageMetadata": { "totalTokenCount": 7 }
        }))
        .unwrap();
        assert_eq!(raw.first_text(), Some("one"));
        assert_eq!(raw.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn first_text_is_none_when_blocked() {
        let raw: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "OTHER" }
        }))
        .unwrap();
        assert_eq!(raw.first_text(), None);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(GenerationRequest::new("p", " ").validate().is_err());
        assert!(GenerationRequest::new("p", "m").with_top_p(1.5).validate().is_err());
        assert!(
            GenerationRequest::new("p", "m")
                .with_max_output_tokens(0)
                .validate()
                .is_err()
        );
    }
}
