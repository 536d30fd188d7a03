use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Error envelope returned for every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ApiError,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Stable, machine-readable error code (e.g. "BAD_REQUEST").
    pub code: String,
    /// Human-friendly error message.
    pub message: String,
    /// Optional fine-grained error details (per-field, hints, etc.).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ApiErrorDetail>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    /// Field path like `chat_history` or `response_format`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Optional hint to help the client fix the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>, details: Vec<ApiErrorDetail>) -> Self {
        Self {
            success: false,
            error: ApiError {
                code: code.into(),
                message: message.into(),
                details,
            },
        }
    }

    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Best-effort detail for a serde/axum JSON rejection message.
pub fn detail_for_json_error(msg: &str) -> Option<ApiErrorDetail> {
    let path = ["user_comment", "chat_history", "response_format", "user", "agent"]
        .into_iter()
        .find(|key| msg.contains(key))
        .map(str::to_string);

    let hint = if msg.contains("expected a sequence") {
        Some("chat_history must be an array of {\"user\": \"...\", \"agent\": \"...\"} objects.".into())
    } else if msg.contains("expected a string") {
        Some("Expected a JSON string here.".into())
    } else if msg.contains("unknown variant") {
        Some("response_format must be \"markup\" or \"speech\".".into())
    } else if msg.contains("Content-Type") {
        Some("Send the body with `content-type: application/json`.".into())
    } else {
        None
    };

    (path.is_some() || hint.is_some()).then_some(ApiErrorDetail { path, hint })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let v = serde_json::to_value(ErrorEnvelope::new("BAD_REQUEST", "nope", vec![])).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"]["code"], "BAD_REQUEST");
        assert!(v["error"].get("details").is_none());
    }

    #[test]
    fn hints_for_common_mistakes() {
        let d = detail_for_json_error("chat_history: invalid type: string \"x\", expected a sequence").unwrap();
        assert_eq!(d.path.as_deref(), Some("chat_history"));
        assert!(d.hint.unwrap().contains("array"));
        assert!(detail_for_json_error("EOF while parsing a value").is_none());
    }
}
