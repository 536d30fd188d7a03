//! Tolerant JSONL reader.
//!
//! - Empty lines are skipped.
//! - Malformed lines (bad UTF-8 or bad JSON) are logged (`warn!`) with their 1-based line number and skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::RagError;

/// Parsed lines of one JSONL source.
#[derive(Debug, Default)]
pub struct JsonlLines {
    /// `(line_no, value)` in file order; line numbers are 1-based.
    pub values: Vec<(usize, Value)>,
    /// Non-empty lines that were not valid UTF-8 or not valid JSON.
    pub malformed: usize,
}

/// Reads a JSONL file.
///
/// # Errors
/// [`RagError::Io`] if the file cannot be opened or read.
pub fn read_jsonl_file(path: impl AsRef<Path>) -> Result<JsonlLines, RagError> {
    info!(path = ?path.as_ref(), "reading JSONL");
    read_jsonl(File::open(path.as_ref())?)
}

/// Reads JSONL from any reader.
pub fn read_jsonl(reader: impl Read) -> Result<JsonlLines, RagError> {
    let mut out = JsonlLines::default();
    for (i, line) in BufReader::new(reader).split(b'\n').enumerate() {
        let bytes = line?;
        let Ok(line) = std::str::from_utf8(&bytes) else {
            out.malformed += 1;
            warn!(line = i + 1, "skipping line that is not valid UTF-8");
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(v) => out.values.push((i + 1, v)),
            Err(e) => {
                out.malformed += 1;
                warn!(line = i + 1, error = %e, "skipping malformed JSON line");
            }
        }
    }
    debug!(values = out.values.len(), malformed = out.malformed, "JSONL parsed");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_and_malformed_lines() {
        let src = "{\"id\":1}\n\n{broken\n  \n{\"id\":2}\n";
        let out = read_jsonl(src.as_bytes()).unwrap();
        assert_eq!(out.malformed, 1);
        assert_eq!(out.values.len(), 2);
        assert_eq!(out.values[0].0, 1);
        assert_eq!(out.values[1].0, 5);
        assert_eq!(out.values[1].1["id"], 2);
    }

    #[test]
    fn invalid_utf8_line_is_skipped_not_fatal() {
        let src: &[u8] = b"{\"id\":1}\n\xff\xfe\n{\"id\":2}\r\n";
        let out = read_jsonl(src).unwrap();
        assert_eq!(out.malformed, 1);
        assert_eq!(out.values.len(), 2);
        assert_eq!(out.values[1].0, 3);
        assert_eq!(out.values[1].1["id"], 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            read_jsonl_file("/definitely/not/here.jsonl"),
            Err(RagError::Io(_))
        ));
    }
}
