use crate::errors::RagError;
use std::{future::Future, pin::Pin};

pub mod gemini;
pub mod hashing;

/// Boxed future returned by [`EmbeddingsProvider::embed`].
pub type EmbedFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>>;

/// Provider interface for embedding generation.
///
/// Async because the real provider performs an HTTP request per call.
pub trait EmbeddingsProvider: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a>;
}
