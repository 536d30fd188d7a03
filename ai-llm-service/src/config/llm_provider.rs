use std::fmt;

/// Hosted backend serving the Gemini models.
///
/// Both speak the same `generateContent` wire format; they differ in URL layout,
/// authentication and the embeddings method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Vertex AI regional endpoint, authenticated with an OAuth bearer token.
    VertexAi,
    /// Public Generative Language API, authenticated with an API key.
    GeminiApi,
}

impl LlmProvider {
    /// Base URL used when no explicit endpoint override is configured.
    pub fn default_endpoint(self, region: &str) -> String {
        match self {
            LlmProvider::VertexAi => format!("https://{region}-aiplatform.googleapis.com"),
            LlmProvider::GeminiApi => "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::VertexAi => f.write_str("vertex-ai"),
            LlmProvider::GeminiApi => f.write_str("gemini-api"),
        }
    }
}
