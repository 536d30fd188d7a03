use std::sync::Arc;

use ai_llm_service::{LlmServiceProfiles, error_handler::env_opt};
use rag_store::{GeminiEmbedder, KnowledgeSearch, MemoryStore, RagConfig, RagStore};
use support_agent::{AgentConfig, ChatPipeline};
use tracing::{info, warn};

use crate::error_handler::{AppError, AppResult};

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The chat pipeline with its generation and retrieval clients.
    pub pipeline: Arc<ChatPipeline>,
}

impl AppState {
    pub fn new(pipeline: ChatPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Builds the clients once from environment variables.
    ///
    /// `RAG_BACKEND` picks the knowledge store: `qdrant` (default) or `memory`.
    pub fn from_env() -> AppResult<Self> {
        let svc = Arc::new(LlmServiceProfiles::from_env()?);
        let model_id = svc.profiles().0.model.clone();
        let agent_cfg = AgentConfig::from_env()?;
        let rag_cfg = RagConfig::from_env()?;
        let embedder = Arc::new(GeminiEmbedder::new(svc.clone()));

        let backend = env_opt("RAG_BACKEND").unwrap_or_else(|| "qdrant".to_string());
        let knowledge: Arc<dyn KnowledgeSearch> = match backend.to_ascii_lowercase().as_str() {
            "qdrant" => {
                info!(url = %rag_cfg.qdrant_url, top_k = rag_cfg.top_k, "knowledge backend: qdrant");
                Arc::new(RagStore::new(rag_cfg, embedder)?)
            }
            "memory" => {
                warn!("knowledge backend: memory; tables start empty");
                Arc::new(MemoryStore::new(embedder).with_top_k(rag_cfg.top_k))
            }
            other => {
                return Err(AppError::Config(format!(
                    "RAG_BACKEND must be `qdrant` or `memory`, got `{other}`"
                )));
            }
        };

        info!(model = %model_id, brand = %agent_cfg.brand, "chat pipeline ready");
        Ok(Self::new(ChatPipeline::new(svc, knowledge, agent_cfg, model_id)))
    }
}
