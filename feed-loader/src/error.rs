//! Error type for the batch loaders.

use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("[Feed Loader] request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("[Feed Loader] {url} answered {status}: {snippet}")]
    Status {
        status: u16,
        url: String,
        snippet: String,
    },

    #[error("[Feed Loader] invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required source field is absent.
    #[error("[Feed Loader] missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("[Feed Loader] io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Rag(#[from] rag_store::RagError),

    #[error(transparent)]
    Llm(#[from] ai_llm_service::AiLlmError),
}

pub type Result<T> = std::result::Result<T, LoaderError>;
