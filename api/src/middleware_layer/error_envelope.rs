use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderValue, Request, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::info;

use crate::app::http::response_envelope::{ErrorEnvelope, detail_for_json_error};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    (parts, bytes)
}

/// The client's `x-request-id` when it sent a non-blank one.
fn client_request_id(headers: &HeaderMap) -> Option<HeaderValue> {
    headers
        .get(REQUEST_ID_HEADER)
        .filter(|v| v.to_str().is_ok_and(|s| !s.trim().is_empty()))
        .cloned()
}

fn mint_request_id() -> HeaderValue {
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    HeaderValue::from_str(&format!("req-{nanos}")).unwrap_or_else(|_| HeaderValue::from_static("req-unknown"))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn code_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_ENTITY",
        _ => "CLIENT_ERROR",
    }
}

/// Wraps plain-text 4xx responses produced by axum itself (unknown route,
/// wrong method, oversized body) in the error envelope, tags every response
/// with a request id and logs it.
pub async fn error_envelope(req: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let request_id = client_request_id(req.headers()).unwrap_or_else(mint_request_id);

    let res = next.run(req).await;
    let status = res.status();

    let mut res = if status.is_client_error() && !is_json(res.headers()) {
        let (mut parts, bytes) = take_body(res).await;
        let original = String::from_utf8_lossy(&bytes);
        let message = match original.trim() {
            "" => status.canonical_reason().unwrap_or("client error").to_string(),
            text => text.to_string(),
        };
        let details = detail_for_json_error(&message).into_iter().collect();
        let body = serde_json::to_vec(&ErrorEnvelope::new(code_for(status), message, details))
            .unwrap_or_else(|_| bytes.to_vec());
        parts
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        parts.headers.remove(axum::http::header::CONTENT_LENGTH);
        Response::from_parts(parts, body.into())
    } else {
        res
    };

    res.headers_mut().insert(REQUEST_ID_HEADER, request_id.clone());
    info!(
        %method,
        path = %path,
        status = status.as_u16(),
        latency_ms = started.elapsed().as_millis(),
        request_id = request_id.to_str().unwrap_or_default(),
        "request handled"
    );
    res
}
