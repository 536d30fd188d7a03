//! Runtime and collection configuration.

use std::fmt;

use crate::errors::RagError;

/// Default number of rows returned by a similarity search.
pub const DEFAULT_TOP_K: usize = 20;
/// Default (and maximum useful) number of rows per insert batch.
pub const DEFAULT_UPSERT_BATCH: usize = 10_000;

/// Distance function used for the vector space.
///
/// Retrieval converts Qdrant scores with `1 - similarity`, which only holds
/// for cosine collections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DistanceKind {
    #[default]
    Cosine,
}

/// Describes the vector space of a collection.
#[derive(Clone, Debug)]
pub struct VectorSpace {
    pub size: usize,
    pub distance: DistanceKind,
}

/// A knowledge table: `{dataset}.{table}`.
///
/// In Qdrant the table lives in the collection `{dataset}_{table}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub dataset: String,
    pub table: String,
}

impl TableRef {
    pub fn new(dataset: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            table: table.into(),
        }
    }

    pub fn collection_name(&self) -> String {
        if self.dataset.is_empty() {
            self.table.clone()
        } else {
            format!("{}_{}", self.dataset, self.table)
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.table)
    }
}

/// Configuration for retrieval and ingestion.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Distance function for newly created collections.
    pub distance: DistanceKind,
    /// Rows per upsert batch.
    pub upsert_batch: usize,
    /// Rows returned by a similarity search.
    pub top_k: usize,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
    /// Concurrent embedding requests during ingestion.
    pub embedding_concurrency: usize,
}

impl RagConfig {
    pub fn new_default(url: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            distance: DistanceKind::Cosine,
            upsert_batch: DEFAULT_UPSERT_BATCH,
            top_k: DEFAULT_TOP_K,
            exact_search: true,
            embedding_concurrency: 8,
        }
    }

    /// Reads `QDRANT_URL`, `QDRANT_API_KEY`, `RETRIEVAL_TOP_K`, `UPSERT_BATCH`
    /// and `EMBEDDING_CONCURRENCY`.
    pub fn from_env() -> Result<Self, RagError> {
        let mut cfg = Self::new_default(
            env_opt("QDRANT_URL").unwrap_or_else(|| "http://localhost:6334".to_string()),
        );
        cfg.qdrant_api_key = env_opt("QDRANT_API_KEY");
        if let Some(v) = env_usize("RETRIEVAL_TOP_K")? {
            cfg.top_k = v;
        }
        if let Some(v) = env_usize("UPSERT_BATCH")? {
            cfg.upsert_batch = v;
        }
        if let Some(v) = env_usize("EMBEDDING_CONCURRENCY")? {
            cfg.embedding_concurrency = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.upsert_batch == 0 || self.upsert_batch > DEFAULT_UPSERT_BATCH {
            return Err(RagError::Config(format!(
                "upsert_batch must be in 1..={DEFAULT_UPSERT_BATCH}"
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be > 0".into()));
        }
        Ok(())
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_usize(name: &str) -> Result<Option<usize>, RagError> {
    match env_opt(name) {
        Some(v) => v
            .parse::<usize>()
            .map(Some)
            .map_err(|_| RagError::Config(format!("{name} must be an unsigned integer, got {v:?}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_name_joins_dataset_and_table() {
        let t = TableRef::new("lunar_data_ds", "webdata");
        assert_eq!(t.collection_name(), "lunar_data_ds_webdata");
        assert_eq!(t.to_string(), "lunar_data_ds.webdata");
        assert_eq!(TableRef::new("", "articledata").collection_name(), "articledata");
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = RagConfig::new_default("http://localhost:6334");
        assert_eq!(cfg.top_k, 20);
        assert_eq!(cfg.upsert_batch, 10_000);
        assert!(cfg.exact_search);
        assert_eq!(cfg.distance, DistanceKind::Cosine);
        assert_eq!(DistanceKind::default(), DistanceKind::Cosine);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let mut cfg = RagConfig::new_default("http://localhost:6334");
        cfg.upsert_batch = 10_001;
        assert!(cfg.validate().is_err());
    }
}
