//! Offline embedder: feature hashing of lowercase word tokens.
//!
//! Deterministic and network-free. Backs the in-process store when no Gemini
//! credentials are configured, and the test suites.

use crate::{EmbeddingsProvider, embed::EmbedFuture};

#[derive(Clone, Debug)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            v[(fnv1a(token.as_bytes()) % self.dim as u64) as usize] += 1.0;
        }
        v
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EmbeddingsProvider for HashingEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a> {
        let v = self.vector(text);
        Box::pin(async move { Ok(v) })
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |h, b| {
        (h ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
    })
}
