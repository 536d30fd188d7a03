//! Public request/response types shared with the HTTP layer.

use serde::{Deserialize, Serialize};

use crate::intent::IntentLabel;

/// One user utterance and the bot's reply.
///
/// # Example
/// ```
/// use support_agent::ChatTurn;
/// let t: ChatTurn = serde_json::from_str(r#"{"user":"hi","agent":"hello"}"#).unwrap();
/// assert_eq!(t.agent, "hello");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user: String,
    pub agent: String,
}

/// How the reply text is post-processed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyFormat {
    /// `<br>` line breaks and `<b>` emphasis for the web chat.
    #[default]
    Markup,
    /// Plain spoken text.
    Speech,
}

/// What the caller gets back: the reply and the history with one more turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub agent_response: String,
    pub chat_history: Vec<ChatTurn>,
}

/// Reply plus how it was produced.
///
/// `Degraded` replies are still valid replies; the code only tells monitoring
/// which step failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatOutcome {
    Answered {
        response: ChatResponse,
        intent: IntentLabel,
    },
    Degraded {
        response: ChatResponse,
        /// `None` when routing itself failed.
        intent: Option<IntentLabel>,
        error_code: &'static str,
    },
}

impl ChatOutcome {
    pub fn response(&self) -> &ChatResponse {
        match self {
            ChatOutcome::Answered { response, .. } | ChatOutcome::Degraded { response, .. } => response,
        }
    }

    pub fn into_response(self) -> ChatResponse {
        match self {
            ChatOutcome::Answered { response, .. } | ChatOutcome::Degraded { response, .. } => response,
        }
    }

    pub fn intent(&self) -> Option<IntentLabel> {
        match self {
            ChatOutcome::Answered { intent, .. } => Some(*intent),
            ChatOutcome::Degraded { intent, .. } => *intent,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ChatOutcome::Degraded { .. })
    }

    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            ChatOutcome::Answered { .. } => None,
            ChatOutcome::Degraded { error_code, .. } => Some(*error_code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_format_is_lowercase_on_the_wire() {
        assert_eq!(serde_json::from_str::<ReplyFormat>("\"speech\"").unwrap(), ReplyFormat::Speech);
        assert_eq!(serde_json::to_string(&ReplyFormat::Markup).unwrap(), "\"markup\"");
        assert_eq!(ReplyFormat::default(), ReplyFormat::Markup);
    }

    #[test]
    fn outcome_accessors() {
        let response = ChatResponse {
            agent_response: "ok".into(),
            chat_history: vec![],
        };
        let o = ChatOutcome::Degraded {
            response: response.clone(),
            intent: None,
            error_code: "ROUTING_FAILED",
        };
        assert!(o.is_degraded());
        assert_eq!(o.error_code(), Some("ROUTING_FAILED"));
        assert_eq!(o.intent(), None);
        assert_eq!(o.into_response(), response);
    }
}
