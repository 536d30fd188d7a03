//! Shared Gemini service with two profiles: `generation` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (provider+endpoint+model+credential+timeout),
//!   so requests naming a different `model_id` get their own client on first use.
//! - Safe for concurrent use: the cache sits behind a `tokio::sync::RwLock`.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::{
    config::{default_config::config_gemini_profiles, llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::Result,
    generation::{GenerateContentResponse, GenerationRequest},
    services::gemini_service::GeminiService,
    text_generator::{GenerationFuture, TextGenerator},
};

pub struct LlmServiceProfiles {
    generation: LlmModelConfig,
    embedding: LlmModelConfig,
    clients: RwLock<HashMap<ClientKey, Arc<GeminiService>>>,
}

impl LlmServiceProfiles {
    pub fn new(generation: LlmModelConfig, embedding: LlmModelConfig) -> Self {
        Self {
            generation,
            embedding,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Builds both profiles from environment variables.
    pub fn from_env() -> Result<Self> {
        let (generation, embedding) = config_gemini_profiles()?;
        Ok(Self::new(generation, embedding))
    }

    /// A request with default sampling targeting the generation profile's model.
    pub fn request(&self, prompt: impl Into<String>) -> GenerationRequest {
        GenerationRequest::new(prompt, self.generation.model.clone())
    }

    /// Computes embeddings using the **embedding** profile.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        let cli = self.get_or_init(&self.embedding).await?;
        cli.embeddings(input).await
    }

    /// Returns references to the current profiles `(generation, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.generation, &self.embedding)
    }

    async fn get_or_init(&self, cfg: &LlmModelConfig) -> Result<Arc<GeminiService>> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.clients.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.clients.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(GeminiService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    fn generation_for(&self, model_id: &str) -> LlmModelConfig {
        if model_id == self.generation.model {
            self.generation.clone()
        } else {
            self.generation.with_model(model_id)
        }
    }
}

impl TextGenerator for LlmServiceProfiles {
    fn generate_raw<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> GenerationFuture<'a, Result<GenerateContentResponse>> {
        Box::pin(async move {
            let cfg = self.generation_for(&request.model_id);
            let cli = self.get_or_init(&cfg).await?;
            cli.generate_content(request).await
        })
    }
}

/// Internal cache key to identify unique client configs.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    credential: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            credential: cfg.credential.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}
