//! Embeddings from the shared Gemini service.

use std::sync::Arc;

use ai_llm_service::service_profiles::LlmServiceProfiles;
use tracing::warn;

use crate::{EmbeddingsProvider, RagError, embed::EmbedFuture};

/// Embeds through [`LlmServiceProfiles::embed`], optionally enforcing a dimension.
#[derive(Clone)]
pub struct GeminiEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: Option<usize>,
}

impl GeminiEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Self {
        Self { svc, dim: None }
    }

    /// Rejects vectors whose length differs from `dim`.
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = Some(dim);
        self
    }
}

impl EmbeddingsProvider for GeminiEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a> {
        Box::pin(async move {
            let v = self.svc.embed(text).await?;
            if let Some(want) = self.dim {
                if v.len() != want {
                    warn!(got = v.len(), want, "embedding dimension differs from configured size");
                    return Err(RagError::VectorSizeMismatch { got: v.len(), want });
                }
            }
            Ok(v)
        })
    }
}
