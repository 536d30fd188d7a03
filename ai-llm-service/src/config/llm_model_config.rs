use crate::config::llm_provider::LlmProvider;

/// Connection settings for one Gemini model.
///
/// Sampling parameters are not part of this struct: they travel with every
/// [`GenerationRequest`](crate::generation::GenerationRequest) so a single
/// client can serve calls with different settings.
///
/// # Fields
///
/// - `provider`: Vertex AI or the public Generative Language API.
/// - `model`: model identifier (e.g. `"gemini-1.5-flash-001"`, `"text-embedding-004"`).
/// - `endpoint`: base URL without path (e.g. `https://us-central1-aiplatform.googleapis.com`).
/// - `project_id` / `region`: Vertex AI resource path components.
/// - `credential`: bearer token (Vertex AI) or API key (Generative Language API).
/// - `timeout_secs`: per-request timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub project_id: String,
    pub region: String,
    pub credential: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Returns a copy of this config targeting another model on the same backend.
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }
}
