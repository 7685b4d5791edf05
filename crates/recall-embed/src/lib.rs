//! Embedding backends and the mode-aware `EmbeddingProvider`.
//!
//! Backends: local BGE-M3 through candle (`bge`), the TogetherAI API
//! (`together`) and a deterministic hashing embedder (`hash`).

pub mod bge;
pub mod device;
pub mod hash;
pub mod pool;
pub mod provider;
pub mod tokenize;
pub mod together;

pub use bge::BgeM3Embedder;
pub use hash::HashEmbedder;
pub use pool::masked_mean;
pub use provider::{build_embedder, l2_norm, l2_normalize, EmbeddingProvider};
pub use together::TogetherEmbedder;
