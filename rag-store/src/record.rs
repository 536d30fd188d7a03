//! Row and result types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A row headed for a knowledge table.
///
/// `text` is what gets embedded; `fields` is stored as the payload and comes
/// back verbatim in [`KnowledgeRecord::fields`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RagRecord {
    /// Natural key; the point id is derived from it.
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl RagRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            fields,
            embedding: None,
        }
    }
}

/// One retrieval hit. Lives for the duration of a single request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KnowledgeRecord {
    /// 0 = most similar.
    pub rank: usize,
    /// Cosine distance (1 - cosine similarity).
    pub distance: f32,
    pub fields: Map<String, Value>,
}

impl KnowledgeRecord {
    /// Field rendered as plain text: strings as-is, `null`/missing as `""`,
    /// anything else as JSON.
    pub fn field_text(&self, key: &str) -> String {
        match self.fields.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_text_handles_all_shapes() {
        let fields = json!({ "title": "Dune", "releaseYear": 2021, "studio": null })
            .as_object()
            .cloned()
            .unwrap();
        let r = KnowledgeRecord {
            rank: 0,
            distance: 0.1,
            fields,
        };
        assert_eq!(r.field_text("title"), "Dune");
        assert_eq!(r.field_text("releaseYear"), "2021");
        assert_eq!(r.field_text("studio"), "");
        assert_eq!(r.field_text("missing"), "");
    }
}
