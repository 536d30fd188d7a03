//! Website media catalog feed: fetch, flatten to string rows, build records.
//!
//! The feed is a JSON object with the items under `playContentArray.playContents`.

use std::time::{Duration, Instant};

use ai_llm_service::error_handler::make_snippet;
use rag_store::RagRecord;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{LoaderError, Result};

pub const DEFAULT_MEDIA_TABLE: &str = "webdata";

/// Row columns, in output order.
pub const MEDIA_COLUMNS: [&str; 12] = [
    "contentId",
    "mediaId",
    "title",
    "runtime",
    "formattedRuntime",
    "logLine",
    "releaseYear",
    "studioId",
    "actors",
    "directors",
    "genres",
    "categories",
];

/// Columns joined into the text that gets embedded.
const EMBED_COLUMNS: [&str; 3] = ["title", "logLine", "genres"];

/// How the feed is paged.
#[derive(Clone, Debug)]
pub struct FeedPaging {
    /// `1` fetches the URL exactly as given.
    pub max_pages: u32,
    pub page_param: String,
}

impl Default for FeedPaging {
    fn default() -> Self {
        Self {
            max_pages: 1,
            page_param: "page".to_string(),
        }
    }
}

/// Flattens one source value to the string stored in a row.
///
/// `null`/missing become `""`, arrays are joined with `", "`, other
/// scalars and objects are rendered as JSON text.
pub fn stringify(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| stringify(Some(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

/// Items of one feed page.
///
/// # Errors
/// [`LoaderError::MissingField`] when `playContentArray.playContents` is not an array.
pub fn feed_items(feed: &Value) -> Result<&[Value]> {
    feed.pointer("/playContentArray/playContents")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or(LoaderError::MissingField {
            field: "playContentArray.playContents",
        })
}

/// Builds the row for one feed item. `index` is the fallback natural key.
pub fn media_record(index: usize, item: &Value) -> RagRecord {
    let fields: Map<String, Value> = MEDIA_COLUMNS
        .iter()
        .map(|col| ((*col).to_string(), Value::String(stringify(item.get(*col)))))
        .collect();

    let text_of = |col: &str| fields.get(col).and_then(Value::as_str).unwrap_or_default();
    let id = ["contentId", "mediaId"]
        .into_iter()
        .map(text_of)
        .find(|v| !v.is_empty())
        .map_or_else(|| index.to_string(), str::to_string);
    let text = EMBED_COLUMNS
        .into_iter()
        .map(text_of)
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(". ");

    RagRecord::new(id, text, fields)
}

/// Records for every item of one feed page, indexed from `offset`.
pub fn media_records(feed: &Value, offset: usize) -> Result<Vec<RagRecord>> {
    Ok(feed_items(feed)?
        .iter()
        .enumerate()
        .map(|(i, item)| media_record(offset + i, item))
        .collect())
}

/// HTTP client for the feed.
pub fn feed_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Fetches every page and flattens it.
///
/// Stops early on the first empty page.
pub async fn fetch_media(client: &reqwest::Client, url: &str, paging: &FeedPaging) -> Result<Vec<RagRecord>> {
    let mut out = Vec::new();
    for page in 1..=paging.max_pages.max(1) {
        let mut req = client.get(url);
        if paging.max_pages > 1 {
            req = req.query(&[(paging.page_param.as_str(), page)]);
        }

        let started = Instant::now();
        debug!(url, page, "fetching media feed page");
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LoaderError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                snippet: make_snippet(&body),
            });
        }
        let feed: Value = serde_json::from_slice(&resp.bytes().await?)?;
        let records = media_records(&feed, out.len())?;
        info!(
            page,
            items = records.len(),
            latency_ms = started.elapsed().as_millis(),
            "media feed page fetched"
        );

        if records.is_empty() {
            if page == 1 {
                warn!(url, "media feed is empty");
            }
            break;
        }
        out.extend(records);
    }
    Ok(out)
}
