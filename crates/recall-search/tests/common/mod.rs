#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use recall_cache::ResponseCache;
use recall_core::config::Thresholds;
use recall_core::error::{Error, Result};
use recall_core::traits::{Embedder, Summarizer};
use recall_core::{SimilarityMode, SummaryLength};
use recall_embed::EmbeddingProvider;
use recall_search::{SearchEngine, Service, SummaryGateway};
use recall_vector::IndexStore;

/// Looks texts up in a fixed table; anything else fails to embed.
pub struct TableEmbedder(pub HashMap<String, Vec<f32>>);

impl Embedder for TableEmbedder {
    fn name(&self) -> &str { "table" }
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.0
            .get(text)
            .cloned()
            .ok_or_else(|| Error::Embedding(format!("no vector for {text:?}")))
    }
}

pub type Calls = Arc<Mutex<Vec<(String, SummaryLength)>>>;

/// Records every call; fails when `fail` is set.
pub struct RecordingSummarizer {
    pub calls: Calls,
    pub fail: bool,
}

impl Summarizer for RecordingSummarizer {
    fn name(&self) -> &str { "recording" }
    fn summarize(&self, text: &str, length: &SummaryLength) -> Result<String> {
        self.calls.lock().unwrap().push((text.to_string(), length.clone()));
        if self.fail {
            return Err(Error::Summarize("backend down".to_string()));
        }
        Ok(format!("{length} summary of {} words", text.split_whitespace().count()))
    }
}

pub fn long_text(seed: &str) -> String {
    (0..40).map(|i| format!("{seed}{i}")).collect::<Vec<_>>().join(" ")
}

pub fn gateway(dir: &Path, fail: bool) -> (Arc<SummaryGateway>, Calls) {
    let calls: Calls = Arc::default();
    let cache = ResponseCache::open(dir.join("cache.db")).unwrap();
    let summarizer = RecordingSummarizer { calls: Arc::clone(&calls), fail };
    (Arc::new(SummaryGateway::new(Box::new(summarizer), cache, 30)), calls)
}

pub struct Fixture {
    pub service: Service,
    pub calls: Calls,
    pub index_path: std::path::PathBuf,
}

/// Build an index from `chunks` (each must be in `table`) and wire a service over it.
pub fn fixture(
    dir: &Path,
    mode: SimilarityMode,
    table: &[(&str, Vec<f32>)],
    chunks: &[&str],
    build: bool,
) -> Fixture {
    fixture_with(dir, mode, table, chunks, build, false)
}

/// Same as `fixture`, with a summarizer that fails every call when `failing` is set.
pub fn fixture_with(
    dir: &Path,
    mode: SimilarityMode,
    table: &[(&str, Vec<f32>)],
    chunks: &[&str],
    build: bool,
    failing: bool,
) -> Fixture {
    let table: HashMap<String, Vec<f32>> = table.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    let provider = || EmbeddingProvider::new(Box::new(TableEmbedder(table.clone())), mode);
    let index_path = dir.join("index.bin");
    let store = IndexStore::new(&index_path);
    if build {
        let chunks: Vec<String> = chunks.iter().map(|c| c.to_string()).collect();
        store.build(&chunks, &provider()).unwrap();
    }
    let (gateway, calls) = gateway(dir, failing);
    let thresholds = match mode {
        SimilarityMode::Cosine => Thresholds::COSINE,
        SimilarityMode::Euclidean => Thresholds::EUCLIDEAN,
    };
    let engine = SearchEngine::new(provider(), store, Arc::clone(&gateway), 5, thresholds);
    Fixture { service: Service::new(engine, gateway), calls, index_path }
}
