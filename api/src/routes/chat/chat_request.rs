use serde::Deserialize;
use support_agent::{ChatTurn, ReplyFormat};

/// Request payload for `POST /chat`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub user_comment: String,
    /// History held by the client and re-sent on every turn.
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
    #[serde(default)]
    pub response_format: ReplyFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let r: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(r.user_comment.is_empty());
        assert!(r.chat_history.is_empty());
        assert_eq!(r.response_format, ReplyFormat::Markup);
    }
}
