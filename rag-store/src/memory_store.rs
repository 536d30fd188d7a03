//! In-process knowledge tables with brute-force cosine ranking.
//!
//! Used for local runs without Qdrant (`RAG_BACKEND=memory`) and by tests.
//! Every search compares the query vector against every stored row.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{
    config::{DEFAULT_TOP_K, TableRef},
    embed::EmbeddingsProvider,
    errors::RagError,
    ingest::{IngestReport, prepare_rows},
    record::RagRecord,
    retrieve::{KnowledgeSearch, SearchFuture, cosine_distance, rank_by_distance},
};

pub struct MemoryStore {
    tables: RwLock<HashMap<TableRef, Vec<RagRecord>>>,
    embedder: Arc<dyn EmbeddingsProvider>,
    top_k: usize,
}

impl MemoryStore {
    pub fn new(embedder: Arc<dyn EmbeddingsProvider>) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            embedder,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Embeds and stores rows. Rows with the same id replace earlier ones.
    pub async fn insert_rows(&self, target: &TableRef, rows: Vec<RagRecord>) -> IngestReport {
        let prepared = prepare_rows(rows, self.embedder.as_ref(), 4).await;
        let written = prepared.rows.len();

        let mut tables = self.tables.write().await;
        let table = tables.entry(target.clone()).or_default();
        if let Some(existing) = table.iter().find_map(|r| r.embedding.as_ref().map(Vec::len)) {
            if existing != prepared.vector_size && written > 0 {
                warn!(%target, existing, incoming = prepared.vector_size, "vector size changed; replacing table");
                table.clear();
            }
        }
        // Last occurrence of an id wins, both within the batch and over stored rows.
        let mut seen = HashSet::new();
        let mut fresh: Vec<RagRecord> = prepared
            .rows
            .into_iter()
            .rev()
            .filter(|r| seen.insert(r.id.clone()))
            .collect();
        fresh.reverse();
        table.retain(|r| !seen.contains(&r.id));
        table.extend(fresh);

        IngestReport {
            batches_ok: usize::from(written > 0),
            batches_failed: 0,
            rows_written: written,
            rows_skipped: prepared.skipped,
        }
    }

    pub async fn len(&self, target: &TableRef) -> usize {
        self.tables.read().await.get(target).map_or(0, Vec::len)
    }
}

impl KnowledgeSearch for MemoryStore {
    fn similarity_search<'a>(&'a self, query_text: &'a str, target: &'a TableRef) -> SearchFuture<'a> {
        Box::pin(async move {
            if self.len(target).await == 0 {
                debug!(%target, "memory table is empty");
                return Ok(Vec::new());
            }

            let query = self.embedder.embed(query_text).await?;
            let tables = self.tables.read().await;
            let Some(rows) = tables.get(target) else {
                return Ok(Vec::new());
            };
            let mut hits = Vec::with_capacity(rows.len());
            for row in rows {
                let vector = row
                    .embedding
                    .as_ref()
                    .ok_or_else(|| RagError::MissingEmbedding(row.id.clone()))?;
                hits.push((cosine_distance(&query, vector)?, row.fields.clone()));
            }
            Ok(rank_by_distance(hits, self.top_k))
        })
    }
}
