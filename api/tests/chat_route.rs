//! HTTP contract of `/chat` and `/`, driven through the router with `oneshot`.

use std::sync::Arc;

use ai_llm_service::{
    AiLlmError, GenerateContentResponse, GenerationRequest, TextGenerator,
    generation::{Candidate, Content, Part},
    text_generator::GenerationFuture,
};
use api::{AppState, CHAT_OUTCOME_HEADER, REQUEST_ID_HEADER, router};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
    response::Response,
};
use rag_store::{HashingEmbedder, MemoryStore};
use serde_json::{Value, json};
use support_agent::{AgentConfig, ChatPipeline};
use tower::ServiceExt;

/// Routes every utterance to `general` and answers with a fixed text.
/// `fail_router` makes the router call fail.
struct StubGenerator {
    fail_router: bool,
}

impl TextGenerator for StubGenerator {
    fn generate_raw<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> GenerationFuture<'a, ai_llm_service::Result<GenerateContentResponse>> {
        Box::pin(async move {
            let is_router = request.prompt.contains("**Categories:**");
            if is_router && self.fail_router {
                return Err(AiLlmError::EmptyResponse {
                    model: request.model_id.clone(),
                });
            }
            let text = if is_router { "general" } else { "Agent: Happy to **help**!" };
            Ok(GenerateContentResponse {
                candidates: vec![Candidate {
                    content: Some(Content {
                        role: Some("model".into()),
                        parts: vec![Part { text: Some(text.into()) }],
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            })
        })
    }
}

fn app(fail_router: bool) -> Router {
    let pipeline = ChatPipeline::new(
        Arc::new(StubGenerator { fail_router }),
        Arc::new(MemoryStore::new(Arc::new(HashingEmbedder::default()))),
        AgentConfig::new("Cymbal"),
        "gemini-test",
    );
    router(Arc::new(AppState::new(pipeline)))
}

fn post_chat(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header(CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn json_body(res: Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn chat_appends_one_turn() {
    let req = post_chat(
        json!({
            "user_comment": "hello",
            "chat_history": [{"user": "hi", "agent": "Hello!"}]
        })
        .to_string(),
    );

    let res = app(false).oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CHAT_OUTCOME_HEADER], "answered");
    assert!(res.headers().contains_key(REQUEST_ID_HEADER));
    let body = json_body(res).await;
    assert_eq!(body["agent_response"], "Happy to <b>help</b>!");
    assert_eq!(body["chat_history"].as_array().unwrap().len(), 2);
    assert_eq!(body["chat_history"][1]["user"], "hello");
}

#[tokio::test]
async fn degraded_reply_is_still_200() {
    let req = post_chat(json!({ "user_comment": "hello" }).to_string());

    let res = app(true).oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CHAT_OUTCOME_HEADER], "degraded; code=ROUTING_FAILED");
    let body = json_body(res).await;
    assert!(!body["agent_response"].as_str().unwrap().is_empty());
    assert_eq!(body["chat_history"].as_array().unwrap().len(), 1);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn empty_body_object_is_accepted() {
    let res = app(false).oneshot(post_chat("{}")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["chat_history"][0]["user"], "");
}

#[tokio::test]
async fn speech_format_is_honoured() {
    let req = post_chat(json!({ "user_comment": "hi", "response_format": "speech" }).to_string());
    let body = json_body(app(false).oneshot(req).await.unwrap()).await;
    assert_eq!(body["agent_response"], "Happy to help!");
}

#[tokio::test]
async fn invalid_json_is_a_400_envelope() {
    let res = app(false).oneshot(post_chat("{not json")).await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = json_body(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn wrong_field_type_is_a_400_envelope() {
    let req = post_chat(json!({ "user_comment": "hi", "chat_history": "nope" }).to_string());

    let res = app(false).oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = json_body(res).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["error"]["details"][0]["path"], "chat_history");
}

#[tokio::test]
async fn unknown_route_gets_the_envelope() {
    let req = Request::builder().uri("/nope").body(Body::empty()).unwrap();

    let res = app(false).oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = json_body(res).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn index_serves_the_chat_page() {
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();

    let res = app(false).oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("fetch('/chat'"));
}

#[tokio::test]
async fn client_request_id_is_echoed() {
    let mut req = post_chat(json!({ "user_comment": "hello" }).to_string());
    req.headers_mut()
        .insert(REQUEST_ID_HEADER, "abc-123".parse().unwrap());

    let res = app(false).oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[REQUEST_ID_HEADER], "abc-123");
}

#[tokio::test]
async fn client_request_id_survives_an_error_envelope() {
    let req = Request::builder()
        .uri("/nope")
        .header(REQUEST_ID_HEADER, "trace-77")
        .body(Body::empty())
        .unwrap();

    let res = app(false).oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()[REQUEST_ID_HEADER], "trace-77");
}
