//! Intent labels produced by the router prompt.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse category of a user utterance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentLabel {
    Recommendations,
    Media,
    Cancellation,
    Payments,
    Login,
    General,
}

/// Knowledge table family a label retrieves from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KnowledgeTarget {
    MediaCatalog,
    SupportArticles,
}

impl IntentLabel {
    pub const ALL: [IntentLabel; 6] = [
        IntentLabel::Recommendations,
        IntentLabel::Media,
        IntentLabel::Cancellation,
        IntentLabel::Payments,
        IntentLabel::Login,
        IntentLabel::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IntentLabel::Recommendations => "recommendations",
            IntentLabel::Media => "media",
            IntentLabel::Cancellation => "cancellation",
            IntentLabel::Payments => "payments",
            IntentLabel::Login => "login",
            IntentLabel::General => "general",
        }
    }

    /// Strict parse of router output.
    ///
    /// Trims whitespace, surrounding quotes/backticks and trailing punctuation,
    /// then matches case-insensitively. Anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw
            .trim()
            .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '*'))
            .trim_end_matches(|c: char| matches!(c, '.' | '!' | ',' | ';' | ':'))
            .trim()
            .to_ascii_lowercase();
        Self::ALL.into_iter().find(|l| l.as_str() == cleaned)
    }

    /// Lenient parse: unrecognised output means `General`.
    pub fn from_router_output(raw: &str) -> Self {
        Self::parse(raw).unwrap_or(IntentLabel::General)
    }

    /// Where to look for knowledge; `None` skips retrieval.
    pub fn target(self) -> Option<KnowledgeTarget> {
        match self {
            IntentLabel::Recommendations | IntentLabel::Media => Some(KnowledgeTarget::MediaCatalog),
            IntentLabel::Cancellation | IntentLabel::Payments | IntentLabel::Login => {
                Some(KnowledgeTarget::SupportArticles)
            }
            IntentLabel::General => None,
        }
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
