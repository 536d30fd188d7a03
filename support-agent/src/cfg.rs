//! Runtime configuration for the chat pipeline, loaded from environment variables.

use ai_llm_service::error_handler::{env_opt, env_opt_u64, env_or_warn};
use rag_store::TableRef;

use crate::intent::KnowledgeTarget;

pub const DEFAULT_DATASET: &str = "lunar_data_ds";
pub const DEFAULT_MEDIA_TABLE: &str = "webdata";
pub const DEFAULT_SUPPORT_TABLE: &str = "articledata";

/// Sent when the model produced nothing usable.
pub const UNAVAILABLE_REPLY: &str =
    "Sorry, I can't answer that right now. Please try again in a moment or ask to talk to a support agent.";

/// Config bag for [`crate::ChatPipeline`].
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Display name substituted into every template.
    pub brand: String,
    pub media_table: TableRef,
    pub support_table: TableRef,
    /// Extra router calls allowed when the label is unparseable.
    pub router_retries: u32,
    pub unavailable_reply: String,
}

impl AgentConfig {
    pub fn new(brand: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            media_table: TableRef::new(DEFAULT_DATASET, DEFAULT_MEDIA_TABLE),
            support_table: TableRef::new(DEFAULT_DATASET, DEFAULT_SUPPORT_TABLE),
            router_retries: 0,
            unavailable_reply: UNAVAILABLE_REPLY.to_string(),
        }
    }

    /// Reads `BRAND`, `KNOWLEDGE_DATASET`, `MEDIA_CATALOG_TABLE`,
    /// `SUPPORT_ARTICLES_TABLE` and `ROUTER_RETRIES`.
    ///
    /// # Errors
    /// `ROUTER_RETRIES` set to something that is not a number.
    pub fn from_env() -> ai_llm_service::Result<Self> {
        let dataset = env("KNOWLEDGE_DATASET", DEFAULT_DATASET);
        let router_retries = env_opt_u64("ROUTER_RETRIES")?.unwrap_or(0);

        Ok(Self {
            brand: env_or_warn("BRAND"),
            media_table: TableRef::new(&dataset, env("MEDIA_CATALOG_TABLE", DEFAULT_MEDIA_TABLE)),
            support_table: TableRef::new(&dataset, env("SUPPORT_ARTICLES_TABLE", DEFAULT_SUPPORT_TABLE)),
            router_retries: u32::try_from(router_retries).unwrap_or(u32::MAX),
            unavailable_reply: UNAVAILABLE_REPLY.to_string(),
        })
    }

    pub fn with_router_retries(mut self, retries: u32) -> Self {
        self.router_retries = retries;
        self
    }

    pub fn table_for(&self, target: KnowledgeTarget) -> &TableRef {
        match target {
            KnowledgeTarget::MediaCatalog => &self.media_table,
            KnowledgeTarget::SupportArticles => &self.support_table,
        }
    }
}

fn env(k: &str, dflt: &str) -> String {
    env_opt(k).unwrap_or_else(|| dflt.to_string())
}
