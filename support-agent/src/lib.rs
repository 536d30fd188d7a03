//! Support chat request pipeline.
//!
//! Public API: [`ChatPipeline::handle_chat`]. It routes the utterance to an
//! intent with one LLM call, looks up knowledge for that intent, composes the
//! answer prompt, calls the LLM again and formats the reply.
//!
//! Every call returns a reply and one more history turn. Failures in routing,
//! retrieval or generation fall back to a knowledge-free prompt and are
//! reported through [`ChatOutcome::Degraded`].

mod api_types;
mod error;

pub mod cfg;
pub mod format;
pub mod intent;
pub mod knowledge;
pub mod prompt;

pub use api_types::{ChatOutcome, ChatResponse, ChatTurn, ReplyFormat};
pub use cfg::AgentConfig;
pub use error::AgentError;
pub use intent::{IntentLabel, KnowledgeTarget};

use std::{sync::Arc, time::Instant};

use ai_llm_service::{GenerationRequest, TextGenerator};
use rag_store::KnowledgeSearch;
use tracing::{debug, info, warn};

use crate::{
    format::{format_for_speech, format_reply},
    knowledge::render_knowledge,
    prompt::{TemplateKind, compose_answer_prompt, compose_router_prompt},
};

/// What went wrong and how far routing got before it did.
struct Failure {
    intent: Option<IntentLabel>,
    error: AgentError,
}

/// The chat pipeline with its injected clients.
///
/// Both clients are shared by every in-flight request; the pipeline itself
/// holds no per-request state, so one instance behind `Arc` serves the server.
pub struct ChatPipeline {
    generator: Arc<dyn TextGenerator>,
    knowledge: Arc<dyn KnowledgeSearch>,
    cfg: AgentConfig,
    model_id: String,
}

impl ChatPipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        knowledge: Arc<dyn KnowledgeSearch>,
        cfg: AgentConfig,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            knowledge,
            cfg,
            model_id: model_id.into(),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.cfg
    }

    /// Answers one utterance with markup formatting.
    ///
    /// # Example
    /// ```no_run
    /// # use support_agent::{ChatPipeline, ChatTurn};
    /// # async fn demo(pipeline: &ChatPipeline) {
    /// let history: Vec<ChatTurn> = Vec::new();
    /// let outcome = pipeline.handle_chat("I want to cancel my plan", history).await;
    /// assert_eq!(outcome.response().chat_history.len(), 1);
    /// # }
    /// ```
    pub async fn handle_chat(&self, user_comment: &str, chat_history: Vec<ChatTurn>) -> ChatOutcome {
        self.handle_chat_with_format(user_comment, chat_history, ReplyFormat::Markup)
            .await
    }

    /// Answers one utterance. Never fails; the returned history is always one
    /// turn longer than `chat_history`.
    pub async fn handle_chat_with_format(
        &self,
        user_comment: &str,
        mut chat_history: Vec<ChatTurn>,
        format: ReplyFormat,
    ) -> ChatOutcome {
        let started = Instant::now();

        let (status, raw) = match self.answer(user_comment, &chat_history).await {
            Ok((intent, raw)) => (Ok(intent), raw),
            Err(Failure { intent, error }) => {
                warn!(
                    error_code = error.code(),
                    intent = ?intent,
                    error = %error,
                    "pipeline degraded; answering without knowledge"
                );
                let raw = self.fallback(intent, user_comment, &chat_history).await;
                (Err((intent, error.code())), raw)
            }
        };

        let mut reply = match format {
            ReplyFormat::Markup => format_reply(&raw),
            ReplyFormat::Speech => format_for_speech(&raw),
        };
        let status = if reply.is_empty() {
            let code = AgentError::EmptyReply.code();
            warn!(error_code = code, "reply is empty; sending fallback apology");
            reply = self.cfg.unavailable_reply.clone();
            match status {
                Ok(intent) => Err((Some(intent), code)),
                failed => failed,
            }
        } else {
            status
        };

        chat_history.push(ChatTurn {
            user: user_comment.to_string(),
            agent: reply.clone(),
        });
        let response = ChatResponse {
            agent_response: reply,
            chat_history,
        };

        info!(
            latency_ms = started.elapsed().as_millis(),
            degraded = status.is_err(),
            turns = response.chat_history.len(),
            "chat handled"
        );
        match status {
            Ok(intent) => ChatOutcome::Answered { response, intent },
            Err((intent, error_code)) => ChatOutcome::Degraded {
                response,
                intent,
                error_code,
            },
        }
    }

    /// Router call, then retrieval, then the final generation call, in order.
    async fn answer(&self, user_comment: &str, history: &[ChatTurn]) -> Result<(IntentLabel, String), Failure> {
        let intent = self.classify(user_comment).await.map_err(|e| Failure {
            intent: None,
            error: AgentError::Routing(e),
        })?;

        let knowledge = match intent.target() {
            Some(target) => {
                let table = self.cfg.table_for(target);
                let records = self
                    .knowledge
                    .similarity_search(user_comment, table)
                    .await
                    .map_err(|e| Failure {
                        intent: Some(intent),
                        error: e.into(),
                    })?;
                info!(%intent, %table, hits = records.len(), "knowledge retrieved");
                render_knowledge(target, &records)
            }
            None => String::new(),
        };

        let prompt = compose_answer_prompt(
            TemplateKind::for_intent(Some(intent)),
            &self.cfg.brand,
            history,
            &knowledge,
            user_comment,
        );
        let request = GenerationRequest::new(prompt, &self.model_id);
        let reply = self.generator.try_generate(&request).await.map_err(|e| Failure {
            intent: Some(intent),
            error: AgentError::Generation(e),
        })?;
        Ok((intent, reply))
    }

    /// Router call with up to `router_retries` extra attempts on an
    /// unrecognised label. Call failures are returned at once.
    async fn classify(&self, user_comment: &str) -> ai_llm_service::Result<IntentLabel> {
        let request = GenerationRequest::new(
            compose_router_prompt(user_comment, &self.cfg.brand),
            &self.model_id,
        );

        let mut raw = String::new();
        for attempt in 0..=self.cfg.router_retries {
            raw = self.generator.try_generate(&request).await?;
            if IntentLabel::parse(&raw).is_some() {
                break;
            }
            warn!(attempt, output = %raw.trim(), "router output is not a known label");
        }

        let intent = IntentLabel::from_router_output(&raw);
        info!(%intent, "intent routed");
        Ok(intent)
    }

    /// Knowledge-free answer; yields `""` if generation fails again.
    async fn fallback(&self, intent: Option<IntentLabel>, user_comment: &str, history: &[ChatTurn]) -> String {
        let kind = TemplateKind::for_intent(intent);
        debug!(?kind, "composing fallback prompt");
        let prompt = compose_answer_prompt(kind, &self.cfg.brand, history, "", user_comment);
        self.generator
            .generate(&GenerationRequest::new(prompt, &self.model_id))
            .await
    }
}
