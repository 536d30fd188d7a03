//! Default Gemini configs loaded from environment variables.
//!
//! Both profiles share the backend selection:
//! - `GEMINI_API_KEY` set → public Generative Language API
//! - otherwise → Vertex AI with `GCP_PROJECT_ID`, `GCP_REGION` and an optional
//!   `GCP_ACCESS_TOKEN` bearer token
//!
//! # Environment variables
//! - `GCP_PROJECT_ID`, `GCP_REGION` = Vertex AI resource path (empty → warning)
//! - `GEMINI_MODEL`     = generation model (default `gemini-1.5-flash-001`)
//! - `EMBEDDING_MODEL`  = embedding model (empty → warning, `text-embedding-004`)
//! - `LLM_ENDPOINT`     = optional base URL override
//! - `LLM_TIMEOUT_SECS` = optional per-request timeout (u64)

use tracing::warn;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{Result, env_opt, env_opt_u64, env_or_warn, validate_http_endpoint},
    generation::{DEFAULT_EMBEDDING_MODEL, DEFAULT_GEMINI_MODEL},
};

/// Location used when `GCP_REGION` is empty.
pub const FALLBACK_REGION: &str = "us-central1";

/// Constructs `(generation, embedding)` profile configs.
///
/// # Errors
/// - `InvalidFormat` if `LLM_ENDPOINT` is not http(s)
/// - `InvalidNumber` if `LLM_TIMEOUT_SECS` is not a number
pub fn config_gemini_profiles() -> Result<(LlmModelConfig, LlmModelConfig)> {
    let project_id = env_or_warn("GCP_PROJECT_ID");
    let region = resolve_region(&env_or_warn("GCP_REGION"));

    let (provider, credential) = match env_opt("GEMINI_API_KEY") {
        Some(key) => (LlmProvider::GeminiApi, Some(key)),
        None => (LlmProvider::VertexAi, env_opt("GCP_ACCESS_TOKEN")),
    };

    let endpoint = match env_opt("LLM_ENDPOINT") {
        Some(url) => {
            validate_http_endpoint("LLM_ENDPOINT", &url)?;
            url
        }
        None => provider.default_endpoint(&region),
    };

    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.or(Some(60));

    let generation = LlmModelConfig {
        provider,
        model: env_opt("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        endpoint,
        project_id,
        region,
        credential,
        timeout_secs,
    };

    let embedding_model = match env_or_warn("EMBEDDING_MODEL") {
        m if m.is_empty() => DEFAULT_EMBEDDING_MODEL.to_string(),
        m => m,
    };
    let embedding = generation.with_model(&embedding_model);

    Ok((generation, embedding))
}

/// Empty regions fall back to [`FALLBACK_REGION`].
pub fn resolve_region(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        warn!(fallback = FALLBACK_REGION, "GCP_REGION is empty; using fallback location");
        FALLBACK_REGION.to_string()
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_region_falls_back() {
        assert_eq!(resolve_region("  "), FALLBACK_REGION);
        assert_eq!(resolve_region("europe-west4"), "europe-west4");
    }

    #[test]
    fn vertex_default_endpoint_is_regional() {
        assert_eq!(
            LlmProvider::VertexAi.default_endpoint("europe-west4"),
            "https://europe-west4-aiplatform.googleapis.com"
        );
    }
}
