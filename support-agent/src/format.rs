//! Deterministic post-processing of model replies.

use std::sync::OnceLock;

use regex::Regex;

const EMPHASIS: &str = "**";

fn role_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*(?:user|agent)\s*:").expect("static regex"))
}

fn speech_disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9 .!?,']").expect("static regex"))
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Removes any number of leading `User:` / `Agent:` labels, then trims.
fn strip_role_labels(text: &str) -> &str {
    let mut rest = text.trim();
    while let Some(m) = role_label().find(rest) {
        rest = rest[m.end()..].trim_start();
    }
    rest.trim_end()
}

/// HTML-ish markup for the chat UI.
///
/// Leading role labels are dropped, newlines become `<br>`, and `**` pairs
/// become `<b>`/`</b>` left to right. An unmatched final `**` stays as is.
pub fn format_reply(raw: &str) -> String {
    let text = strip_role_labels(raw).replace('\n', "<br>");

    let pairs = text.matches(EMPHASIS).count() / 2;
    let mut out = String::with_capacity(text.len() + pairs * 3);
    let mut rest = text.as_str();
    for n in 0..pairs * 2 {
        let Some(at) = rest.find(EMPHASIS) else { break };
        out.push_str(&rest[..at]);
        out.push_str(if n % 2 == 0 { "<b>" } else { "</b>" });
        rest = &rest[at + EMPHASIS.len()..];
    }
    out.push_str(rest);
    out
}

/// Plain text for text-to-speech: only `[a-zA-Z0-9 .!?,']`, single spaces.
pub fn format_for_speech(raw: &str) -> String {
    let text = strip_role_labels(raw);
    let text = speech_disallowed().replace_all(text, " ");
    whitespace_run().replace_all(&text, " ").trim().to_string()
}
