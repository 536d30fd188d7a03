//! Knowledge tables for the support chat: vector retrieval and batched ingestion.
//!
//! This crate provides:
//! - [`KnowledgeSearch`]: top-K cosine nearest neighbours for a text query
//! - [`RagStore`]: the Qdrant-backed implementation, plus batched ingestion
//! - [`MemoryStore`]: an in-process implementation for local runs and tests
//!
//! Query embeddings are computed per call through an [`EmbeddingsProvider`].

mod config;
mod embed;
mod embed_pool;
mod errors;
mod ingest;
mod io_jsonl;
mod memory_store;
mod qdrant_facade;
mod record;
mod retrieve;

pub use config::{DEFAULT_TOP_K, DEFAULT_UPSERT_BATCH, DistanceKind, RagConfig, TableRef, VectorSpace};
pub use embed::{EmbedFuture, EmbeddingsProvider, gemini::GeminiEmbedder, hashing::HashingEmbedder};
pub use embed_pool::embed_missing;
pub use errors::RagError;
pub use ingest::IngestReport;
pub use io_jsonl::{JsonlLines, read_jsonl, read_jsonl_file};
pub use memory_store::MemoryStore;
pub use record::{KnowledgeRecord, RagRecord};
pub use retrieve::{KnowledgeSearch, SearchFuture, cosine_distance, rank_by_distance};

use std::sync::Arc;

use tracing::{debug, info};

/// Qdrant-backed knowledge tables.
///
/// Holds one gRPC client and the embedder; both are safe to share, so wrap the
/// store in `Arc` and clone it into request handlers.
pub struct RagStore {
    cfg: RagConfig,
    client: qdrant_facade::QdrantFacade,
    embedder: Arc<dyn EmbeddingsProvider>,
}

impl RagStore {
    /// # Errors
    /// Returns `RagError::Config` / `RagError::Qdrant` if the client cannot be built.
    pub fn new(cfg: RagConfig, embedder: Arc<dyn EmbeddingsProvider>) -> Result<Self, RagError> {
        debug!(url = %cfg.qdrant_url, top_k = cfg.top_k, "RagStore::new");
        let client = qdrant_facade::QdrantFacade::new(&cfg)?;
        Ok(Self {
            cfg,
            client,
            embedder,
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    /// Embeds the query, then runs an exact cosine search over `target`.
    ///
    /// # Errors
    /// Embedding failures or Qdrant failures (a missing collection included).
    pub async fn similarity_search(
        &self,
        query_text: &str,
        target: &TableRef,
    ) -> Result<Vec<KnowledgeRecord>, RagError> {
        let collection = target.collection_name();
        let vector = self.embedder.embed(query_text).await?;
        let hits = self
            .client
            .search(&collection, vector, self.cfg.top_k as u64, self.cfg.exact_search)
            .await?;

        let ranked = rank_by_distance(
            hits.into_iter()
                .map(|(score, fields)| (retrieve::similarity_to_distance(score), fields))
                .collect(),
            self.cfg.top_k,
        );
        info!(%target, hits = ranked.len(), "similarity search done");
        Ok(ranked)
    }

    /// Writes rows into `target` in batches of `cfg.upsert_batch`.
    ///
    /// # Errors
    /// Only collection setup errors; batch failures are counted in the report.
    pub async fn ingest_rows(&self, target: &TableRef, rows: Vec<RagRecord>) -> Result<IngestReport, RagError> {
        ingest::ingest_records(
            &self.cfg,
            &self.client,
            &target.collection_name(),
            rows,
            self.embedder.as_ref(),
        )
        .await
    }
}

impl KnowledgeSearch for RagStore {
    fn similarity_search<'a>(&'a self, query_text: &'a str, target: &'a TableRef) -> SearchFuture<'a> {
        Box::pin(RagStore::similarity_search(self, query_text, target))
    }
}
