//! Library-scoped log formatting for `ai-llm-service`.
//!
//! Binaries compose [`layer`] with their own global layer and put
//! [`exclude_this_crate`] on the global one, so Gemini call logs are printed once
//! with source locations and span timings.

use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::{Level, Metadata};
use tracing_subscriber::filter::{Directive, FilterFn};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Target prefix of every event emitted by this crate.
pub const TARGET_PREFIX: &str = "ai_llm_service";

/// Second-precision RFC3339 UTC timestamps, e.g. `2025-09-12T10:20:30Z`.
#[derive(Clone, Debug, Default)]
struct Rfc3339Seconds;

impl FormatTime for Rfc3339Seconds {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let s = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Compact fmt layer that only renders this crate's events.
///
/// ANSI colors are enabled only when stdout is a terminal. Span close events
/// are included so `#[instrument]`ed calls report their duration.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_timer(Rfc3339Seconds)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(io::stdout().is_terminal())
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(filter::filter_fn(|meta| meta.target().starts_with(TARGET_PREFIX)))
}

/// Per-layer filter dropping events emitted by this crate.
pub fn exclude_this_crate() -> FilterFn<fn(&Metadata<'_>) -> bool> {
    FilterFn::new(not_this_crate as fn(&Metadata<'_>) -> bool)
}

fn not_this_crate(meta: &Metadata<'_>) -> bool {
    !meta.target().starts_with(TARGET_PREFIX)
}

/// Level directive for this library only, e.g. `ai_llm_service=debug`.
pub fn level_directive(level: Level) -> Directive {
    let s = format!("{TARGET_PREFIX}={}", level.as_str().to_lowercase());
    Directive::from_str(&s).unwrap_or_else(|_| Directive::from(level))
}

/// `RUST_LOG` (or `default`) plus a directive for this library.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    base.add_directive(level_directive(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_targets_this_crate() {
        assert_eq!(level_directive(Level::DEBUG).to_string(), "ai_llm_service=debug");
    }
}
