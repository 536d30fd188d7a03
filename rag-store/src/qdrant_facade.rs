//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! All Qdrant calls go through this facade so the rest of the crate deals in
//! collection names, `Vec<f32>` and `serde_json` payloads only.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchParamsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QValue, VectorParamsBuilder, value::Kind,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::{DistanceKind, RagConfig, VectorSpace};
use crate::errors::RagError;

pub struct QdrantFacade {
    client: Qdrant,
    distance: DistanceKind,
}

impl QdrantFacade {
    /// Builds the client; no network traffic happens here.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            distance: cfg.distance,
        })
    }

    /// Creates the collection when it does not exist yet.
    pub async fn ensure_collection(&self, collection: &str, space: &VectorSpace) -> Result<(), RagError> {
        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        if exists {
            debug!(collection, "collection already exists");
            return Ok(());
        }

        let distance = match space.distance {
            DistanceKind::Cosine => Distance::Cosine,
        };

        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(space.size as u64, distance)),
            )
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        info!(collection, size = space.size, distance = ?self.distance, "collection created");
        Ok(())
    }

    /// Upserts one batch and waits for it to be applied.
    pub async fn upsert_points(&self, collection: &str, points: Vec<PointStruct>) -> Result<usize, RagError> {
        if points.is_empty() {
            return Ok(0);
        }
        let n = points.len();
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        Ok(n)
    }

    /// Similarity search returning `(score, payload)` as Qdrant ranks them.
    pub async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        top_k: u64,
        exact: bool,
    ) -> Result<Vec<(f32, Map<String, Value>)>, RagError> {
        debug!(collection, top_k, exact, "qdrant search");

        let mut builder = SearchPointsBuilder::new(collection, vector, top_k).with_payload(true);
        if exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(res
            .result
            .into_iter()
            .map(|p| (p.score, qpayload_to_json(p.payload)))
            .collect())
    }
}

/// Converts a Qdrant payload into a JSON object, nested lists and structs included.
fn qpayload_to_json(payload: HashMap<String, QValue>) -> Map<String, Value> {
    payload
        .into_iter()
        .map(|(k, v)| (k, qvalue_to_json(v)))
        .collect()
}

fn qvalue_to_json(v: QValue) -> Value {
    match v.kind {
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::IntegerValue(i)) => Value::from(i),
        Some(Kind::DoubleValue(f)) => Value::from(f),
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::ListValue(list)) => Value::Array(list.values.into_iter().map(qvalue_to_json).collect()),
        Some(Kind::StructValue(s)) => Value::Object(qpayload_to_json(s.fields)),
        Some(Kind::NullValue(_)) | None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::{ListValue, Struct};
    use serde_json::json;

    fn q(kind: Kind) -> QValue {
        QValue { kind: Some(kind) }
    }

    #[test]
    fn payload_converts_nested_values() {
        let mut meta = HashMap::new();
        meta.insert("studio".to_string(), q(Kind::StringValue("Legendary".into())));

        let mut payload = HashMap::new();
        payload.insert("title".to_string(), q(Kind::StringValue("Dune".into())));
        payload.insert("releaseYear".to_string(), q(Kind::IntegerValue(2021)));
        payload.insert("rating".to_string(), q(Kind::DoubleValue(8.5)));
        payload.insert(
            "tags".to_string(),
            q(Kind::ListValue(ListValue {
                values: vec![q(Kind::StringValue("sci-fi".into()))],
            })),
        );
        payload.insert("meta".to_string(), q(Kind::StructValue(Struct { fields: meta })));
        payload.insert("gone".to_string(), QValue { kind: None });

        let out = Value::Object(qpayload_to_json(payload));
        assert_eq!(
            out,
            json!({
                "title": "Dune",
                "releaseYear": 2021,
                "rating": 8.5,
                "tags": ["sci-fi"],
                "meta": { "studio": "Legendary" },
                "gone": null
            })
        );
    }
}
