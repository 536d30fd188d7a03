//! Object-safe generation seam.
//!
//! The request pipeline depends on `Arc<dyn TextGenerator>` so tests can swap in
//! a scripted generator. Only [`TextGenerator::generate_raw`] must be
//! implemented; the text-extracting entry points are provided.

use std::{future::Future, pin::Pin};

use tracing::error;

use crate::{
    error_handler::{AiLlmError, Result},
    generation::{GenerateContentResponse, GenerationRequest},
};

/// Boxed, `Send` future returned by the trait methods.
pub type GenerationFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Generation client contract. Implementations must be safe to share across
/// concurrent requests.
pub trait TextGenerator: Send + Sync {
    /// Raw-response mode: the full structured response, or the error.
    fn generate_raw<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> GenerationFuture<'a, Result<GenerateContentResponse>>;

    /// First candidate's first text part, or the error.
    fn try_generate<'a>(&'a self, request: &'a GenerationRequest) -> GenerationFuture<'a, Result<String>> {
        Box::pin(async move {
            let raw = self.generate_raw(request).await?;
            raw.first_text()
                .map(str::to_owned)
                .ok_or_else(|| AiLlmError::EmptyResponse {
                    model: request.model_id.clone(),
                })
        })
    }

    /// Never fails: logs the error and yields `""`.
    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> GenerationFuture<'a, String> {
        Box::pin(async move {
            match self.try_generate(request).await {
                Ok(text) => text,
                Err(e) => {
                    error!(model = %request.model_id, error = %e, "generation failed; returning empty text");
                    String::new()
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{Candidate, Content, Part};

    struct Fixed(Option<&'static str>);

    impl TextGenerator for Fixed {
        fn generate_raw<'a>(
            &'a self,
            _request: &'a GenerationRequest,
        ) -> GenerationFuture<'a, Result<GenerateContentResponse>> {
            Box::pin(async move {
                match self.0 {
                    Some(text) => Ok(GenerateContentResponse {
                        candidates: vec![Candidate {
                            content: Some(Content {
                                role: Some("model".into()),
                                parts: vec![Part {
                                    text: Some(text.into()),
                                }],
                            }),
                            ..Default::default()
                        }],
                        ..Default::default()
                    }),
                    None => Ok(GenerateContentResponse::default()),
                }
            })
        }
    }

    #[tokio::test]
    async fn try_generate_extracts_text() {
        let req = GenerationRequest::new("p", "m");
        assert_eq!(Fixed(Some("answer")).try_generate(&req).await.unwrap(), "answer");
    }

    #[tokio::test]
    async fn empty_response_is_an_error_for_strict_mode() {
        let req = GenerationRequest::new("p", "m");
        let err = Fixed(None).try_generate(&req).await.unwrap_err();
        assert!(matches!(err, AiLlmError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn resilient_mode_returns_empty_string() {
        let req = GenerationRequest::new("p", "m");
        assert_eq!(Fixed(None).generate(&req).await, "");
        let dynamic: &dyn TextGenerator = &Fixed(Some("ok"));
        assert_eq!(dynamic.generate(&req).await, "ok");
    }
}
