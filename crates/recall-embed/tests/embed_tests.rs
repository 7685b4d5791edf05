use recall_core::config::{EmbeddingBackend, Settings};
use recall_core::SimilarityMode;
use recall_embed::{l2_norm, EmbeddingProvider, HashEmbedder};

fn hash_settings(mode: SimilarityMode) -> Settings {
    let mut settings = Settings::default();
    settings.similarity = mode;
    settings.embedding.backend = EmbeddingBackend::Hash;
    settings.embedding.hash_dim = 256;
    settings
}

#[test]
fn hash_provider_shapes_and_determinism() {
    let provider = EmbeddingProvider::from_settings(&hash_settings(SimilarityMode::Cosine)).expect("provider");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs: Vec<Vec<f32>> = provider.embed_batch(&texts).into_iter().map(|r| r.expect("embed")).collect();
    let (v1, v2) = (&embs[0], &embs[1]);

    assert_eq!(v1.len(), 256, "embedding dim follows embedding.hash_dim");

    let norm = l2_norm(v1);
    assert!((norm - 1.0).abs() <= 1e-3, "cosine mode is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn euclidean_mode_matches_raw_backend_output() {
    let provider = EmbeddingProvider::from_settings(&hash_settings(SimilarityMode::Euclidean)).expect("provider");
    assert_eq!(provider.mode(), SimilarityMode::Euclidean);
    let raw = recall_core::traits::Embedder::embed(&HashEmbedder::new(256), "the quick brown fox").unwrap();
    let v = provider.embed("the quick brown fox").unwrap();
    assert_eq!(v, raw);
    assert!(l2_norm(&v) > 1.0, "raw vectors keep their magnitude");
}

#[test]
fn batch_failures_stay_per_item() {
    let provider = EmbeddingProvider::from_settings(&hash_settings(SimilarityMode::Cosine)).expect("provider");
    let texts = vec!["first chunk".to_string(), "   ".to_string(), "third chunk".to_string()];
    let results = provider.embed_batch(&texts);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
}

#[test]
fn missing_local_model_is_a_config_error() {
    let mut settings = Settings::default();
    settings.embedding.backend = EmbeddingBackend::HuggingFace;
    settings.embedding.model_dir = "/nonexistent/recall/bge-m3".to_string();
    assert!(EmbeddingProvider::from_settings(&settings).is_err());
}
