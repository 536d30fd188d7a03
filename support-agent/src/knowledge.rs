//! Renders retrieved records into the knowledge section of a prompt.
//!
//! Only allow-listed fields are rendered; distances never reach the prompt.

use rag_store::KnowledgeRecord;
use serde_json::{Map, Value};

use crate::intent::KnowledgeTarget;

/// Rendered as `title (releaseYear): logLine`.
pub const MEDIA_FIELDS: [&str; 3] = ["title", "releaseYear", "logLine"];
pub const ARTICLE_FIELDS: [&str; 4] = ["title", "desc", "keywords", "url"];

pub fn render_knowledge(target: KnowledgeTarget, records: &[KnowledgeRecord]) -> String {
    match target {
        KnowledgeTarget::MediaCatalog => render_media_block(records),
        KnowledgeTarget::SupportArticles => render_support_block(records),
    }
}

/// One `title (releaseYear): logLine` line per record.
pub fn render_media_block(records: &[KnowledgeRecord]) -> String {
    records
        .iter()
        .map(|r| {
            let [title, year, log_line] = MEDIA_FIELDS.map(|k| r.field_text(k));
            format!("{title} ({year}): {log_line}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One compact JSON object per record.
pub fn render_support_block(records: &[KnowledgeRecord]) -> String {
    records
        .iter()
        .map(|r| {
            let projected: Map<String, Value> = ARTICLE_FIELDS
                .iter()
                .map(|k| ((*k).to_string(), Value::String(r.field_text(k))))
                .collect();
            Value::Object(projected).to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(rank: usize, fields: Value) -> KnowledgeRecord {
        KnowledgeRecord {
            rank,
            distance: 0.123,
            fields: fields.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn media_lines_use_allow_list() {
        let out = render_media_block(&[
            rec(0, json!({"title": "Dune", "releaseYear": "2021", "logLine": "Spice.", "actors": "X"})),
            rec(1, json!({"title": "Heat"})),
        ]);
        assert_eq!(out, "Dune (2021): Spice.\nHeat (): ");
        assert!(!out.contains("0.123"));
    }

    #[test]
    fn articles_render_as_compact_json() {
        let out = render_support_block(&[rec(
            0,
            json!({
                "title": "Cancel your plan",
                "desc": "Steps to cancel",
                "keywords": "cancel, plan",
                "url": "https://support.com/en_us/cancel-abc",
                "hash": "abc",
            }),
        )]);
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["url"], "https://support.com/en_us/cancel-abc");
        assert!(v.get("hash").is_none());
        assert!(v.get("distance").is_none());
        assert!(!out.contains('\n'));
    }

    #[test]
    fn no_records_no_block() {
        assert_eq!(render_knowledge(KnowledgeTarget::MediaCatalog, &[]), "");
        assert_eq!(render_knowledge(KnowledgeTarget::SupportArticles, &[]), "");
    }
}
