//! Unified error handling for `ai-llm-service`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library, and groups domain-specific errors in nested enums ([`ConfigError`],
//! [`ProviderError`]). Small helpers for reading environment variables are
//! provided and return the unified [`Result<T>`] alias.
//!
//! All messages include the prefix `[AI LLM Service]` to simplify attribution in logs.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::warn;

use crate::config::llm_provider::LlmProvider;

/// Maximum number of characters kept from an upstream error body.
pub const SNIPPET_MAX_CHARS: usize = 240;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup or request validation).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Upstream returned something we could not use.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Underlying HTTP transport error, timeouts included.
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// The response decoded fine but carried no text in its first candidate.
    #[error("[AI LLM Service] model {model} returned no candidate text")]
    EmptyResponse {
        /// Model that produced the empty response.
        model: String,
    },
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup and request validation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A number failed to parse (timeouts, limits).
    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `LLM_TIMEOUT_SECS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `LLM_ENDPOINT`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `temperature`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },

    /// Model name was empty.
    #[error("[AI LLM Service] model name must not be empty")]
    EmptyModel,

    /// Stop sequences contained one or more empty strings.
    #[error("[AI LLM Service] stop sequences must not contain empty strings")]
    InvalidStopSequence,
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Error raised while talking to a concrete backend.
#[derive(Debug, Error)]
#[error("[AI LLM Service] {provider}: {kind}")]
pub struct ProviderError {
    pub provider: LlmProvider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: LlmProvider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }
}

/// What went wrong with a backend call.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderErrorKind {
    /// The endpoint is empty or does not start with http/https.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The backend needs a credential that was not configured.
    #[error("missing credential")]
    MissingCredential,

    /// A credential could not be turned into a header value.
    #[error("invalid credential header: {0}")]
    InvalidHeader(String),

    /// Upstream returned a non-successful HTTP status.
    #[error("{0}")]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as expected.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Non-2xx answer from upstream with a trimmed body snippet.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub url: String,
    pub snippet: String,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

/// Trims an upstream body to at most [`SNIPPET_MAX_CHARS`] characters.
pub fn make_snippet(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(SNIPPET_MAX_CHARS) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Reads an environment variable, falling back to `""` with a warning when unset.
pub fn env_or_warn(name: &'static str) -> String {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => {
            warn!(var = name, "environment variable is empty; set {name} before serving traffic");
            String::new()
        }
    }
}

/// Reads an optional, non-empty environment variable.
pub fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but not a valid `u64`.
pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    match env_opt(name) {
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers (return unified `Result<T>`)                           */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
pub fn validate_range_f32(
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
    detail: &'static str,
) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, detail }.into())
    }
}

/// Ensures that a list of stop sequences contains no empty strings.
pub fn validate_stop_sequences<S>(stops: &[S]) -> Result<()>
where
    S: AsRef<str>,
{
    if stops.iter().any(|s| s.as_ref().is_empty()) {
        Err(ConfigError::InvalidStopSequence.into())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_capped() {
        let long = "x".repeat(SNIPPET_MAX_CHARS + 50);
        let s = make_snippet(&long);
        assert_eq!(s.chars().count(), SNIPPET_MAX_CHARS + 1);
        assert!(s.ends_with('…'));
    }

    #[test]
    fn short_snippet_is_trimmed_only() {
        assert_eq!(make_snippet("  quota exceeded \n"), "quota exceeded");
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let long = "é".repeat(SNIPPET_MAX_CHARS * 2);
        let s = make_snippet(&long);
        assert!(s.starts_with('é'));
    }

    #[test]
    fn endpoint_scheme_is_checked() {
        assert!(validate_http_endpoint("LLM_ENDPOINT", "https://x").is_ok());
        assert!(validate_http_endpoint("LLM_ENDPOINT", "ftp://x").is_err());
    }

    #[test]
    fn range_rejects_nan() {
        assert!(validate_range_f32("top_p", f32::NAN, 0.0, 1.0, "0..=1").is_err());
        assert!(validate_range_f32("top_p", 0.8, 0.0, 1.0, "0..=1").is_ok());
    }

    #[test]
    fn empty_stop_sequence_is_rejected() {
        assert!(validate_stop_sequences(&["END", ""]).is_err());
        assert!(validate_stop_sequences::<&str>(&[]).is_ok());
    }
}
