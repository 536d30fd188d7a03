//! Support article export (JSONL): one article per line.

use rag_store::{JsonlLines, RagRecord};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{
    error::{LoaderError, Result},
    media::stringify,
};

pub const DEFAULT_ARTICLE_TABLE: &str = "articledata";
pub const DEFAULT_URL_PREFIX: &str = "https://support.com/en_us/";

/// `(row column, JSON pointer)` for every copied source field.
const ARTICLE_SOURCE: [(&str, &str); 11] = [
    ("id", "/id"),
    ("type", "/type"),
    ("title", "/attributes/title"),
    ("lang", "/attributes/lang"),
    ("createdAt", "/attributes/createdAt"),
    ("updatedAt", "/attributes/updatedAt"),
    ("publishedAt", "/attributes/publishedAt"),
    ("slug", "/attributes/slug"),
    ("hash", "/attributes/hash"),
    ("desc", "/attributes/metaDescription"),
    ("keywords", "/attributes/article/metaKeywords"),
];

const EMBED_COLUMNS: [&str; 3] = ["title", "desc", "keywords"];

/// Articles parsed from one export.
#[derive(Debug, Default)]
pub struct ParsedArticles {
    pub records: Vec<RagRecord>,
    /// Lines that were not JSON or lacked a required field.
    pub skipped: usize,
}

fn field_name(pointer: &'static str) -> &'static str {
    pointer.trim_start_matches('/')
}

/// Builds the row for one article.
///
/// # Errors
/// [`LoaderError::MissingField`] naming the first absent source field.
pub fn article_record(article: &Value, url_prefix: &str) -> Result<RagRecord> {
    let mut fields = Map::new();
    for (column, pointer) in ARTICLE_SOURCE {
        let value = article.pointer(pointer).ok_or(LoaderError::MissingField {
            field: field_name(pointer),
        })?;
        fields.insert(column.to_string(), Value::String(stringify(Some(value))));
    }

    let text_of = |col: &str| fields.get(col).and_then(Value::as_str).unwrap_or_default().to_string();
    let url = format!("{url_prefix}{}-{}", text_of("slug"), text_of("hash"));
    let id = text_of("id");
    let text = EMBED_COLUMNS
        .into_iter()
        .map(text_of)
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(". ");

    fields.insert("url".to_string(), Value::String(url));
    Ok(RagRecord::new(id, text, fields))
}

/// Converts parsed JSONL lines; bad lines are logged with their line number and skipped.
pub fn parse_articles(lines: JsonlLines, url_prefix: &str) -> ParsedArticles {
    let mut out = ParsedArticles {
        skipped: lines.malformed,
        ..Default::default()
    };
    for (line, value) in lines.values {
        match article_record(&value, url_prefix) {
            Ok(record) => out.records.push(record),
            Err(e) => {
                out.skipped += 1;
                warn!(line, error = %e, "skipping article");
            }
        }
    }
    info!(articles = out.records.len(), skipped = out.skipped, "articles parsed");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_store::read_jsonl;
    use serde_json::json;

    fn article() -> Value {
        json!({
            "id": 1001,
            "type": "article",
            "attributes": {
                "title": "How to cancel",
                "lang": "en_us",
                "createdAt": "2024-01-01",
                "updatedAt": "2024-02-01",
                "publishedAt": null,
                "slug": "how-to-cancel",
                "hash": "ab12",
                "metaDescription": "Cancel from settings",
                "article": { "metaKeywords": ["cancel", "plan"] }
            }
        })
    }

    #[test]
    fn builds_url_and_flat_row() {
        let r = article_record(&article(), DEFAULT_URL_PREFIX).unwrap();
        assert_eq!(r.id, "1001");
        assert_eq!(r.fields["url"], "https://support.com/en_us/how-to-cancel-ab12");
        assert_eq!(r.fields["keywords"], "cancel, plan");
        assert_eq!(r.fields["publishedAt"], "");
        assert_eq!(r.fields.len(), 12);
        assert_eq!(r.text, "How to cancel. Cancel from settings. cancel, plan");
    }

    #[test]
    fn empty_description_array_is_blank() {
        let mut a = article();
        a["attributes"]["metaDescription"] = json!([]);
        let r = article_record(&a, "https://help.example/").unwrap();
        assert_eq!(r.fields["desc"], "");
        assert_eq!(r.fields["url"], "https://help.example/how-to-cancel-ab12");
    }

    #[test]
    fn missing_field_is_named() {
        let mut a = article();
        a["attributes"].as_object_mut().unwrap().remove("hash");
        match article_record(&a, DEFAULT_URL_PREFIX) {
            Err(LoaderError::MissingField { field }) => assert_eq!(field, "attributes/hash"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_lines_are_skipped() {
        let mut missing = article();
        missing.as_object_mut().unwrap().remove("type");
        let src = format!("{}\n\n{{oops\n{}\n", article(), missing);
        let parsed = parse_articles(read_jsonl(src.as_bytes()).unwrap(), DEFAULT_URL_PREFIX);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.skipped, 2);
    }
}
