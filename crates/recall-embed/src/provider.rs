use std::time::Duration;
use tracing::{info, warn};

use recall_core::config::{EmbeddingBackend, Settings};
use recall_core::error::{Error, Result};
use recall_core::traits::Embedder;
use recall_core::SimilarityMode;

use crate::bge::BgeM3Embedder;
use crate::hash::HashEmbedder;
use crate::together::TogetherEmbedder;

/// Mode-aware front for an embedding backend.
///
/// Cosine mode returns unit vectors; euclidean mode returns the backend's
/// vector untouched. Every failure is an `Error::Embedding`.
pub struct EmbeddingProvider {
    backend: Box<dyn Embedder>,
    mode: SimilarityMode,
}

impl EmbeddingProvider {
    pub fn new(backend: Box<dyn Embedder>, mode: SimilarityMode) -> Self {
        Self { backend, mode }
    }

    /// Resolve the configured backend once.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let backend = build_embedder(settings)?;
        info!("Embedding backend: {} ({} mode)", backend.name(), settings.similarity);
        Ok(Self::new(backend, settings.similarity))
    }

    pub fn mode(&self) -> SimilarityMode { self.mode }

    pub fn name(&self) -> &str { self.backend.name() }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = self.backend.embed(text)?;
        if v.is_empty() {
            return Err(Error::Embedding("backend returned an empty vector".to_string()));
        }
        if v.iter().any(|x| !x.is_finite()) {
            return Err(Error::Embedding("backend returned non-finite values".to_string()));
        }
        if self.mode == SimilarityMode::Cosine {
            l2_normalize(&mut v)?;
        }
        Ok(v)
    }

    /// Embed each text independently; one failure does not affect the others.
    pub fn embed_batch(&self, texts: &[String]) -> Vec<Result<Vec<f32>>> {
        texts
            .iter()
            .map(|t| {
                let r = self.embed(t);
                if let Err(e) = &r { warn!("Embedding failed: {}", e); }
                r
            })
            .collect()
    }
}

pub fn build_embedder(settings: &Settings) -> Result<Box<dyn Embedder>> {
    let cfg = &settings.embedding;
    match cfg.backend {
        EmbeddingBackend::HuggingFace => {
            let dir = recall_core::config::expand_path(&cfg.model_dir);
            let model = BgeM3Embedder::load(&dir, cfg.max_len)
                .map_err(|e| Error::InvalidConfig(format!("failed to load local embedding model: {e}")))?;
            Ok(Box::new(model))
        }
        EmbeddingBackend::TogetherAi => {
            let key = settings.together.require_key()?;
            let e = TogetherEmbedder::new(
                &settings.together.base_url,
                key,
                &cfg.model,
                Duration::from_secs(cfg.timeout_secs),
            )?;
            Ok(Box::new(e))
        }
        EmbeddingBackend::Hash => Ok(Box::new(HashEmbedder::new(cfg.hash_dim))),
    }
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt() as f32
}

/// Scale `v` to unit length in place. A zero vector has no direction and is rejected.
pub fn l2_normalize(v: &mut [f32]) -> Result<()> {
    let norm = v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return Err(Error::Embedding("cannot normalize a zero-length vector".to_string()));
    }
    for x in v.iter_mut() {
        *x = (f64::from(*x) / norm) as f32;
    }
    Ok(())
}
