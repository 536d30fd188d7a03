//! Gemini HTTP client for text generation and embeddings.
//!
//! Minimal, non-streaming client around the Gemini REST API. URLs are derived
//! from [`LlmModelConfig`]:
//! - Vertex AI: `{endpoint}/v1/projects/{project}/locations/{region}/publishers/google/models/{model}:{method}`
//! - Generative Language API: `{endpoint}/v1beta/models/{model}:{method}`
//!
//! Generation always uses `generateContent`. Embeddings use `predict` on
//! Vertex AI and `embedContent` on the public API.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, error, info, warn};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, HttpError, ProviderError, ProviderErrorKind, Result, make_snippet,
    },
    generation::{Content, GenerateContentResponse, GenerationRequest},
};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Thin client for one Gemini model.
///
/// Keeps a preconfigured `reqwest::Client` (timeout and auth headers).
#[derive(Debug)]
pub struct GeminiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
}

impl GeminiService {
    /// Creates a new [`GeminiService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidEndpoint` if `cfg.endpoint` is not http(s)
    /// - `MissingCredential` for the public API without a key
    /// - `InvalidHeader` if the credential is not a valid header value
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self> {
        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ProviderError::new(
                cfg.provider,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        match (cfg.provider, cfg.credential.as_deref()) {
            (LlmProvider::VertexAi, Some(token)) => {
                headers.insert(header::AUTHORIZATION, header_value(cfg.provider, &format!("Bearer {token}"))?);
            }
            (LlmProvider::VertexAi, None) => {
                warn!(model = %cfg.model, "no GCP_ACCESS_TOKEN configured; Vertex AI calls will be unauthenticated");
            }
            (LlmProvider::GeminiApi, Some(key)) => {
                headers.insert("x-goog-api-key", header_value(cfg.provider, key)?);
            }
            (LlmProvider::GeminiApi, None) => {
                return Err(ProviderError::new(cfg.provider, ProviderErrorKind::MissingCredential).into());
            }
        }

        let timeout_secs = cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(headers)
            .build()?;

        info!(
            provider = %cfg.provider,
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs,
            "GeminiService initialized"
        );

        Ok(Self { client, cfg })
    }

    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Performs one non-streaming `generateContent` call.
    ///
    /// The request's `model_id` must match this client's model; the caller
    /// (the profile cache) picks the client by model.
    pub async fn generate_content(&self, request: &GenerationRequest) -> Result<GenerateContentResponse> {
        request.validate()?;
        let url = method_url(&self.cfg, "generateContent");
        debug!(
            model = %self.cfg.model,
            prompt_len = request.prompt.len(),
            grounded = request.ground_in_search,
            "POST {url}"
        );
        let out: GenerateContentResponse = self.post_json(&url, &request.to_body(), "generateContent").await?;
        debug!(model = %self.cfg.model, candidates = out.candidates.len(), "generateContent decoded");
        Ok(out)
    }

    /// Computes one embedding vector for `input`.
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>> {
        let values = match self.cfg.provider {
            LlmProvider::VertexAi => {
                let url = method_url(&self.cfg, "predict");
                let body = PredictBody {
                    instances: vec![PredictInstance { content: input }],
                };
                let out: PredictResponse = self.post_json(&url, &body, "predict").await?;
                out.predictions
                    .into_iter()
                    .next()
                    .map(|p| p.embeddings.values)
            }
            LlmProvider::GeminiApi => {
                let url = method_url(&self.cfg, "embedContent");
                let body = EmbedContentBody {
                    content: Content {
                        role: None,
                        ..Content::user(input)
                    },
                };
                let out: EmbedContentResponse = self.post_json(&url, &body, "embedContent").await?;
                Some(out.embedding.values)
            }
        };

        match values {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(ProviderError::new(
                self.cfg.provider,
                ProviderErrorKind::Decode("expected a non-empty embedding vector".into()),
            )
            .into()),
        }
    }

    async fn post_json<B, R>(&self, url: &str, body: &B, op: &'static str) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let started = Instant::now();
        let resp = self.client.post(url).json(body).send().await.map_err(|e| {
            error!(
                error = %e,
                model = %self.cfg.model,
                op,
                latency_ms = started.elapsed().as_millis(),
                "request to Gemini failed"
            );
            AiLlmError::from(e)
        })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            error!(
                %status,
                %snippet,
                model = %self.cfg.model,
                op,
                latency_ms = started.elapsed().as_millis(),
                "Gemini returned non-success status"
            );
            return Err(ProviderError::new(
                self.cfg.provider,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url: url.to_string(),
                    snippet,
                }),
            )
            .into());
        }

        match resp.json::<R>().await {
            Ok(v) => {
                info!(
                    model = %self.cfg.model,
                    op,
                    latency_ms = started.elapsed().as_millis(),
                    "Gemini call ok"
                );
                Ok(v)
            }
            Err(e) => {
                error!(
                    error = %e,
                    model = %self.cfg.model,
                    op,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode Gemini response"
                );
                Err(ProviderError::new(self.cfg.provider, ProviderErrorKind::Decode(e.to_string())).into())
            }
        }
    }
}

fn header_value(provider: LlmProvider, raw: &str) -> Result<header::HeaderValue> {
    header::HeaderValue::from_str(raw).map_err(|e| {
        ProviderError::new(provider, ProviderErrorKind::InvalidHeader(e.to_string())).into()
    })
}

/// Full URL for a model method on the configured backend.
pub fn method_url(cfg: &LlmModelConfig, method: &str) -> String {
    let base = cfg.endpoint.trim().trim_end_matches('/');
    match cfg.provider {
        LlmProvider::VertexAi => format!(
            "{base}/v1/projects/{}/locations/{}/publishers/google/models/{}:{method}",
            cfg.project_id, cfg.region, cfg.model
        ),
        LlmProvider::GeminiApi => format!("{base}/v1beta/models/{}:{method}", cfg.model),
    }
}

/* ---------------------------- embeddings wire --------------------------- */

#[derive(Serialize)]
struct PredictBody<'a> {
    instances: Vec<PredictInstance<'a>>,
}

#[derive(Serialize)]
struct PredictInstance<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    embeddings: EmbeddingValues,
}

#[derive(Serialize)]
struct EmbedContentBody {
    content: Content,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(provider: LlmProvider, endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider,
            model: "gemini-1.5-flash-001".into(),
            endpoint: endpoint.into(),
            project_id: "acme-prod".into(),
            region: "us-central1".into(),
            credential: Some("secret".into()),
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn vertex_url_contains_project_and_region() {
        let c = cfg(LlmProvider::VertexAi, "https://us-central1-aiplatform.googleapis.com/");
        assert_eq!(
            method_url(&c, "generateContent"),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/acme-prod/locations/us-central1/publishers/google/models/gemini-1.5-flash-001:generateContent"
        );
    }

    #[test]
    fn public_api_url_is_model_scoped() {
        let c = cfg(LlmProvider::GeminiApi, "https://generativelanguage.googleapis.com");
        assert_eq!(
            method_url(&c.with_model("text-embedding-004"), "embedContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/text-embedding-004:embedContent"
        );
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let err = GeminiService::new(cfg(LlmProvider::VertexAi, "localhost:8080")).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::InvalidEndpoint(_),
                ..
            })
        ));
    }

    #[test]
    fn public_api_requires_key() {
        let mut c = cfg(LlmProvider::GeminiApi, "https://generativelanguage.googleapis.com");
        c.credential = None;
        assert!(GeminiService::new(c).is_err());
    }

    #[test]
    fn embed_body_has_no_role() {
        let body = EmbedContentBody {
            content: Content {
                role: None,
                ..Content::user("hello")
            },
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v, serde_json::json!({ "content": { "parts": [{ "text": "hello" }] } }));
    }
}
