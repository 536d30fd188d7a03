//! Batched ingestion: resolve vectors → ensure collection → upsert in batches.
//!
//! Each batch is logged on its own. A failed batch is not retried and does not
//! stop the batches after it; already written batches stay written.

use crate::config::{RagConfig, VectorSpace};
use crate::embed::EmbeddingsProvider;
use crate::embed_pool::embed_missing;
use crate::errors::RagError;
use crate::qdrant_facade::QdrantFacade;
use crate::record::RagRecord;

use indicatif::{ProgressBar, ProgressStyle};
use qdrant_client::qdrant::PointStruct;
use serde::Serialize;
use services::uuid::stable_uuid;
use tracing::{error, info, warn};

/// Outcome of one ingestion run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub batches_ok: usize,
    pub batches_failed: usize,
    pub rows_written: usize,
    /// Rows dropped before writing (embedding failed or wrong dimension).
    pub rows_skipped: usize,
}

/// Rows that are ready to write, plus the vector size they share.
pub(crate) struct PreparedRows {
    pub rows: Vec<RagRecord>,
    pub vector_size: usize,
    pub skipped: usize,
}

/// Embeds what is missing and drops rows that cannot be written.
///
/// The vector size is taken from the first embedded row; rows of another size
/// are dropped with a warning.
pub(crate) async fn prepare_rows(
    mut records: Vec<RagRecord>,
    provider: &dyn EmbeddingsProvider,
    concurrency: usize,
) -> PreparedRows {
    let total = records.len();
    embed_missing(&mut records, provider, None, concurrency).await;

    let vector_size = records
        .iter()
        .find_map(|r| r.embedding.as_ref().map(Vec::len))
        .unwrap_or(0);

    records.retain(|r| match &r.embedding {
        Some(v) if v.len() == vector_size && vector_size > 0 => true,
        Some(v) => {
            warn!(id = %r.id, got = v.len(), want = vector_size, "dropping row with mismatched vector size");
            false
        }
        None => false,
    });

    PreparedRows {
        skipped: total - records.len(),
        rows: records,
        vector_size,
    }
}

/// Writes `records` into `collection` in batches of `cfg.upsert_batch`.
pub(crate) async fn ingest_records(
    cfg: &RagConfig,
    client: &QdrantFacade,
    collection: &str,
    records: Vec<RagRecord>,
    provider: &dyn EmbeddingsProvider,
) -> Result<IngestReport, RagError> {
    info!(collection, rows = records.len(), "ingesting rows");

    let prepared = prepare_rows(records, provider, cfg.embedding_concurrency).await;
    let mut report = IngestReport {
        rows_skipped: prepared.skipped,
        ..Default::default()
    };
    if prepared.rows.is_empty() {
        warn!(collection, skipped = report.rows_skipped, "nothing to ingest");
        return Ok(report);
    }

    client
        .ensure_collection(
            collection,
            &VectorSpace {
                size: prepared.vector_size,
                distance: cfg.distance,
            },
        )
        .await?;

    let batch_size = cfg.upsert_batch.max(1);
    let pb = ProgressBar::new(prepared.rows.len().div_ceil(batch_size) as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} batches ({eta})",
        )
        .map(|s| s.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for (n, chunk) in prepared.rows.chunks(batch_size).enumerate() {
        let batch = n + 1;
        let points = match build_points(chunk) {
            Ok(p) => p,
            Err(e) => {
                report.batches_failed += 1;
                error!(collection, batch, error = %e, "batch could not be built");
                pb.inc(1);
                continue;
            }
        };
        match client.upsert_points(collection, points).await {
            Ok(written) => {
                report.batches_ok += 1;
                report.rows_written += written;
                info!(collection, batch, rows = written, "batch loaded successfully");
            }
            Err(e) => {
                report.batches_failed += 1;
                error!(collection, batch, rows = chunk.len(), error = %e, "batch failed to load");
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("ingestion complete");
    info!(
        collection,
        batches_ok = report.batches_ok,
        batches_failed = report.batches_failed,
        rows_written = report.rows_written,
        rows_skipped = report.rows_skipped,
        "ingestion finished"
    );
    Ok(report)
}

/// Builds Qdrant points: UUID v5 of the natural key, vector, row fields as payload.
fn build_points(chunk: &[RagRecord]) -> Result<Vec<PointStruct>, RagError> {
    chunk
        .iter()
        .map(|r| {
            let vector = r
                .embedding
                .clone()
                .ok_or_else(|| RagError::MissingEmbedding(r.id.clone()))?;
            Ok(PointStruct::new(
                stable_uuid(&r.id).to_string(),
                vector,
                r.fields.clone(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::{EmbedFuture, hashing::HashingEmbedder};
    use serde_json::{Map, json};

    struct FixedDim(usize);

    impl EmbeddingsProvider for FixedDim {
        fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a> {
            let n = if text == "odd" { self.0 + 1 } else { self.0 };
            Box::pin(async move { Ok(vec![0.5; n]) })
        }
    }

    #[tokio::test]
    async fn prepare_drops_mismatched_rows() {
        let rows = vec![
            RagRecord::new("1", "first", Map::new()),
            RagRecord::new("2", "odd", Map::new()),
            RagRecord::new("3", "third", Map::new()),
        ];
        let p = prepare_rows(rows, &FixedDim(4), 2).await;
        assert_eq!(p.vector_size, 4);
        assert_eq!(p.skipped, 1);
        assert_eq!(p.rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), ["1", "3"]);
    }

    #[tokio::test]
    async fn points_use_stable_ids() {
        let fields = json!({ "title": "Dune" }).as_object().cloned().unwrap();
        let rows = vec![RagRecord::new("content-1", "Dune", fields)];
        let p = prepare_rows(rows, &HashingEmbedder::new(8), 1).await;
        let a = build_points(&p.rows).unwrap();
        let b = build_points(&p.rows).unwrap();
        assert_eq!(a[0].id, b[0].id);
        assert!(a[0].payload.contains_key("title"));
    }

    #[test]
    fn missing_vector_is_an_error() {
        let rows = vec![RagRecord::new("x", "x", Map::new())];
        assert!(matches!(build_points(&rows), Err(RagError::MissingEmbedding(id)) if id == "x"));
    }
}
