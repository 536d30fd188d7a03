//! Typed error for the support-agent crate.
//!
//! None of these reach the HTTP caller: the pipeline turns them into a
//! degraded reply and reports [`AgentError::code`] instead.

use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AgentError {
    /// The router call failed.
    #[error("[Support Agent] intent routing failed: {0}")]
    Routing(#[source] ai_llm_service::AiLlmError),

    /// Knowledge lookup failed.
    #[error("[Support Agent] retrieval failed: {0}")]
    Retrieval(#[from] rag_store::RagError),

    /// The final generation call failed.
    #[error("[Support Agent] reply generation failed: {0}")]
    Generation(#[source] ai_llm_service::AiLlmError),

    /// The model answered with nothing usable.
    #[error("[Support Agent] reply was empty after formatting")]
    EmptyReply,
}

impl AgentError {
    /// Stable code for logs and the degraded-outcome header.
    pub fn code(&self) -> &'static str {
        match self {
            AgentError::Routing(_) => "ROUTING_FAILED",
            AgentError::Retrieval(_) => "RETRIEVAL_FAILED",
            AgentError::Generation(_) => "GENERATION_FAILED",
            AgentError::EmptyReply => "EMPTY_REPLY",
        }
    }
}
