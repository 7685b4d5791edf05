use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use recall_core::error::{Error, Result};
use recall_core::traits::Embedder;

/// Deterministic bag-of-tokens embedder.
///
/// Each lowercased alphanumeric token adds a weight to one bucket chosen by
/// its hash. Vectors are returned unnormalized, so texts sharing tokens land
/// close together under both metrics. Used for tests and offline development.
pub struct HashEmbedder {
    dim: usize,
    name: String,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1), name: format!("hash:d{}", dim.max(1)) }
    }

    pub fn dim(&self) -> usize { self.dim }
}

impl Embedder for HashEmbedder {
    fn name(&self) -> &str { &self.name }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0f32; self.dim];
        let mut tokens = 0usize;
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
        {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let weight = 0.5 + (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += weight;
            tokens += 1;
        }
        if tokens == 0 {
            return Err(Error::Embedding("text has no tokens to embed".to_string()));
        }
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_and_case_insensitive() {
        let e = HashEmbedder::new(64);
        let a = e.embed("Hello, world").unwrap();
        let b = e.embed("hello world").unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_text_is_an_embedding_error() {
        let e = HashEmbedder::new(8);
        assert!(matches!(e.embed("  ... "), Err(Error::Embedding(_))));
    }
}
