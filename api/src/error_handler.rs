use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::app::http::response_envelope::{ErrorEnvelope, detail_for_json_error};

/// Public application error type.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("[API] configuration error: {0}")]
    Config(String),

    // --- IO / network / server ---
    #[error("[API] failed to bind listener on {address}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("[API] server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("[API] bad request: {0}")]
    BadRequest(String),

    #[error("[API] internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // startup-only, but still map them
            AppError::Config(_) | AppError::Bind { .. } | AppError::Server(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind { .. } => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, details) = match &self {
            AppError::BadRequest(msg) => (msg.clone(), detail_for_json_error(msg).into_iter().collect()),
            other => {
                error!(code = other.error_code(), error = %other, "request failed");
                ("internal server error".to_string(), Vec::new())
            }
        };
        ErrorEnvelope::new(self.error_code(), message, details).into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Every JSON rejection (syntax, wrong types, missing content type) is a 400.
impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<ai_llm_service::AiLlmError> for AppError {
    fn from(err: ai_llm_service::AiLlmError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<rag_store::RagError> for AppError {
    fn from(err: rag_store::RagError) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400() {
        let res = AppError::BadRequest("expected value".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_details_are_hidden() {
        let e = AppError::Internal("secret stack".into());
        assert_eq!(e.error_code(), "INTERNAL_ERROR");
        assert_eq!(e.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
