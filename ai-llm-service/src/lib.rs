//! Shared Gemini client used by the chat pipeline, the retrieval layer and the
//! offline loaders.
//!
//! Construct one [`service_profiles::LlmServiceProfiles`] at startup, wrap it in
//! `Arc` and hand clones to whoever needs generation or embeddings.

pub mod config;
pub mod error_handler;
pub mod generation;
pub mod service_profiles;
pub mod services;
pub mod telemetry;
pub mod text_generator;

pub use error_handler::{AiLlmError, Result};
pub use generation::{GenerateContentResponse, GenerationRequest, SafetySetting};
pub use service_profiles::LlmServiceProfiles;
pub use text_generator::TextGenerator;
