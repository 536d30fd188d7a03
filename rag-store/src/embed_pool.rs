//! Embedding executor with concurrency and dimension checks.

use crate::{embed::EmbeddingsProvider, errors::RagError, record::RagRecord};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

/// Fills `embedding` for records that have none.
///
/// Failures are per record: the record keeps `embedding == None`, a warning is
/// logged and the call moves on. Returns how many records failed.
///
/// - `expected_dim`: if `Some`, vectors of another size count as failures.
/// - `concurrency`: maximum number of in-flight embedding requests.
pub async fn embed_missing(
    records: &mut [RagRecord],
    provider: &dyn EmbeddingsProvider,
    expected_dim: Option<usize>,
    concurrency: usize,
) -> usize {
    let idxs: Vec<usize> = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.embedding.is_none().then_some(i))
        .collect();

    if idxs.is_empty() {
        debug!("embed_pool::embed_missing: nothing to embed");
        return 0;
    }
    info!(pending = idxs.len(), concurrency, "embedding records");

    let results: Vec<(usize, Result<Vec<f32>, RagError>)> = stream::iter(idxs)
        .map(|i| {
            let text = records[i].text.clone();
            async move { (i, provider.embed(&text).await) }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut failed = 0usize;
    for (i, res) in results {
        let checked = res.and_then(|v| match expected_dim {
            Some(want) if v.len() != want => Err(RagError::VectorSizeMismatch { got: v.len(), want }),
            _ => Ok(v),
        });
        match checked {
            Ok(v) => records[i].embedding = Some(v),
            Err(e) => {
                failed += 1;
                warn!(id = %records[i].id, error = %e, "embedding failed; record will be skipped");
            }
        }
    }

    debug!(failed, "embed_pool::embed_missing: done");
    failed
}
