//! Retrieval contract and ranking helpers.
//!
//! Every backend ends up in [`rank_by_distance`]: ascending cosine distance,
//! ranks from 0, at most `top_k` rows.

use std::{cmp::Ordering, future::Future, pin::Pin};

use serde_json::{Map, Value};
use tracing::trace;

use crate::{config::TableRef, errors::RagError, record::KnowledgeRecord};

/// Boxed future returned by [`KnowledgeSearch::similarity_search`].
pub type SearchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<KnowledgeRecord>, RagError>> + Send + 'a>>;

/// Nearest-neighbour lookup over a knowledge table.
///
/// Implementations embed `query_text` on every call (no caching) and must be
/// safe to share across concurrent requests.
pub trait KnowledgeSearch: Send + Sync {
    fn similarity_search<'a>(&'a self, query_text: &'a str, target: &'a TableRef) -> SearchFuture<'a>;
}

/// Cosine distance between two vectors.
///
/// A zero-norm side yields `1.0` (no similarity).
///
/// # Errors
/// [`RagError::VectorSizeMismatch`] when the lengths differ.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f32, RagError> {
    if a.len() != b.len() {
        return Err(RagError::VectorSizeMismatch {
            got: b.len(),
            want: a.len(),
        });
    }
    let (mut dot, mut na, mut nb) = (0f64, 0f64, 0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return Ok(1.0);
    }
    Ok((1.0 - dot / (na.sqrt() * nb.sqrt())) as f32)
}

/// Qdrant reports cosine similarity; retrieval ranks by distance.
pub fn similarity_to_distance(score: f32) -> f32 {
    1.0 - score
}

/// Sorts `(distance, fields)` ascending, keeps `top_k`, assigns ranks.
/// NaN distances sort last.
pub fn rank_by_distance(mut hits: Vec<(f32, Map<String, Value>)>, top_k: usize) -> Vec<KnowledgeRecord> {
    hits.sort_by(|a, b| match (a.0.is_nan(), b.0.is_nan()) {
        (false, false) => a.0.total_cmp(&b.0),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    });
    hits.truncate(top_k);
    trace!(kept = hits.len(), top_k, "retrieve::rank_by_distance");
    hits.into_iter()
        .enumerate()
        .map(|(rank, (distance, fields))| KnowledgeRecord {
            rank,
            distance,
            fields,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(title: &str) -> Map<String, Value> {
        json!({ "title": title }).as_object().cloned().unwrap()
    }

    #[test]
    fn cosine_distance_basics() {
        assert!(cosine_distance(&[1.0, 0.0], &[2.0, 0.0]).unwrap().abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 3.0]).unwrap() - 1.0).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]).unwrap() - 2.0).abs() < 1e-6);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 1.0]).unwrap(), 1.0);
        assert!(cosine_distance(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn ranking_is_ascending_and_capped() {
        let hits = (0..30)
            .rev()
            .map(|i| (i as f32 / 100.0, fields(&format!("t{i}"))))
            .collect::<Vec<_>>();
        let out = rank_by_distance(hits, 20);
        assert_eq!(out.len(), 20);
        assert_eq!(out[0].rank, 0);
        assert_eq!(out[0].fields["title"], "t0");
        assert!(out.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(out.last().map(|r| r.rank), Some(19));
    }

    #[test]
    fn nan_sorts_last() {
        let out = rank_by_distance(vec![(f32::NAN, fields("nan")), (0.4, fields("ok"))], 20);
        assert_eq!(out[0].fields["title"], "ok");
        assert_eq!(out[1].fields["title"], "nan");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(rank_by_distance(Vec::new(), 20).is_empty());
    }

    #[test]
    fn similarity_maps_to_distance() {
        assert_eq!(similarity_to_distance(1.0), 0.0);
        assert_eq!(similarity_to_distance(0.25), 0.75);
    }
}
