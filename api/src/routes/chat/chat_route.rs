//! POST /chat: one conversational turn.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use support_agent::ChatOutcome;

use crate::{
    app::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::chat::chat_request::ChatRequest,
};

/// Reports whether the reply is degraded; the JSON body never does.
pub const CHAT_OUTCOME_HEADER: &str = "x-chat-outcome";

/// Handler: POST /chat
///
/// Always 200 once the body parses, even when the reply is degraded.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/chat \
///   -H 'content-type: application/json' \
///   -d '{"user_comment":"I want to cancel my plan","chat_history":[]}'
/// ```
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;

    let outcome = state
        .pipeline
        .handle_chat_with_format(&body.user_comment, body.chat_history, body.response_format)
        .await;

    let header = outcome_header(&outcome)?;
    let mut res = Json(outcome.into_response()).into_response();
    res.headers_mut().insert(CHAT_OUTCOME_HEADER, header);
    Ok(res)
}

fn outcome_header(outcome: &ChatOutcome) -> AppResult<HeaderValue> {
    let value = match outcome.error_code() {
        None => "answered".to_string(),
        Some(code) => format!("degraded; code={code}"),
    };
    HeaderValue::from_str(&value).map_err(|e| AppError::Internal(e.to_string()))
}
