//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for rag-store operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RagError {
    /// I/O or filesystem errors.
    #[error("[RAG Store] io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("[RAG Store] parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("[RAG Store] config error: {0}")]
    Config(String),

    /// Mismatch in vector dimensionality.
    #[error("[RAG Store] vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// A row reached the writer without a vector.
    #[error("[RAG Store] missing embedding for row {0}")]
    MissingEmbedding(String),

    /// The embedding provider failed.
    #[error("[RAG Store] embedding error: {0}")]
    Embedding(String),

    /// Qdrant client errors (wrapped).
    #[error("[RAG Store] qdrant error: {0}")]
    Qdrant(String),
}

impl From<ai_llm_service::AiLlmError> for RagError {
    fn from(e: ai_llm_service::AiLlmError) -> Self {
        RagError::Embedding(e.to_string())
    }
}
