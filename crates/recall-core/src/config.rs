//! Configuration loader and typed settings.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`,
//! `APP_*` env vars (`__` separates nested keys) and the legacy variables
//! `SIMILARITY_MODE`, `EMBEDDING_MODE`, `LLM_MODE`, `TOGETHERAI_API_KEY`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::SimilarityMode;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment
            .merge(Env::prefixed("APP_").split("__"))
            .merge(legacy_env("SIMILARITY_MODE", "similarity"))
            .merge(legacy_env("EMBEDDING_MODE", "embedding.backend"))
            .merge(legacy_env("TOGETHERAI_EMBEDDING_MODEL", "embedding.model"))
            .merge(legacy_env("LLM_MODE", "llm.backend"))
            .merge(legacy_env("TOGETHERAI_API_KEY", "together.api_key"));

        Ok(Self { figment })
    }

    /// Wrap an already assembled figment (tests, embedding applications).
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    /// Extract and validate the typed settings. Unknown modes or backends and
    /// inconsistent thresholds are reported as `Error::InvalidConfig`.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

fn legacy_env(var: &'static str, key: &'static str) -> Env {
    Env::raw().only(&[var]).map(move |_| key.into())
}

/// Process-wide settings, read once at startup and passed to each component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub similarity: SimilarityMode,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub together: TogetherSettings,
    pub paths: PathSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    /// Remote model name.
    pub model: String,
    /// Directory holding `tokenizer.json`, `config.json` and `pytorch_model.bin`.
    pub model_dir: String,
    pub max_len: usize,
    /// Dimensionality of the hashing backend.
    pub hash_dim: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::TogetherAi,
            model: "togethercomputer/m2-bert-80M-8k-retrieval".to_string(),
            model_dir: "models/bge-m3".to_string(),
            max_len: 512,
            hash_dim: 384,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub backend: LlmBackend,
    pub ollama_bin: String,
    pub ollama_model: String,
    pub together_model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Inputs with at most this many words are returned unsummarized.
    pub min_words: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            backend: LlmBackend::TogetherAi,
            ollama_bin: "ollama".to_string(),
            ollama_model: "llama3".to_string(),
            together_model: "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free".to_string(),
            max_tokens: 300,
            timeout_secs: 120,
            min_words: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TogetherSettings {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for TogetherSettings {
    fn default() -> Self {
        Self { base_url: "https://api.together.xyz/v1".to_string(), api_key: None }
    }
}

impl TogetherSettings {
    pub fn require_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(k) if !k.trim().is_empty() => Ok(k),
            _ => Err(Error::InvalidConfig(
                "TogetherAI backend selected but together.api_key (TOGETHERAI_API_KEY) is not set".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub data_dir: String,
    pub index_path: String,
    pub cache_db_path: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            index_path: "index/index.bin".to_string(),
            cache_db_path: "cache/cache.db".to_string(),
        }
    }
}

impl PathSettings {
    pub fn data_dir(&self) -> PathBuf { expand_path(&self.data_dir) }
    pub fn index_path(&self) -> PathBuf { expand_path(&self.index_path) }
    pub fn cache_db_path(&self) -> PathBuf { expand_path(&self.cache_db_path) }
}

/// Score cut-offs for one metric.
///
/// `retrieval` drops degenerate neighbours before a candidate is chosen;
/// `accept` and `summarize` drive the direct/summarized decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub retrieval: f32,
    pub accept: f32,
    pub summarize: f32,
}

impl Thresholds {
    pub const COSINE: Thresholds = Thresholds { retrieval: 0.2, accept: 0.6, summarize: 0.4 };
    pub const EUCLIDEAN: Thresholds = Thresholds { retrieval: 8.0, accept: 4.0, summarize: 5.0 };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub top_k: usize,
    pub cosine: Thresholds,
    pub euclidean: Thresholds,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { top_k: 5, cosine: Thresholds::COSINE, euclidean: Thresholds::EUCLIDEAN }
    }
}

impl SearchSettings {
    pub fn thresholds(&self, mode: SimilarityMode) -> Thresholds {
        match mode {
            SimilarityMode::Cosine => self.cosine,
            SimilarityMode::Euclidean => self.euclidean,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self { Self { host: "0.0.0.0".to_string(), port: 8000 } }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.search.top_k == 0 {
            return Err(Error::InvalidConfig("search.top_k must be at least 1".to_string()));
        }
        let c = self.search.cosine;
        if c.summarize > c.accept {
            return Err(Error::InvalidConfig(format!(
                "search.cosine.summarize ({}) must not exceed search.cosine.accept ({})",
                c.summarize, c.accept
            )));
        }
        let e = self.search.euclidean;
        if e.accept > e.summarize {
            return Err(Error::InvalidConfig(format!(
                "search.euclidean.accept ({}) must not exceed search.euclidean.summarize ({})",
                e.accept, e.summarize
            )));
        }
        if self.embedding.backend == EmbeddingBackend::Hash && self.embedding.hash_dim == 0 {
            return Err(Error::InvalidConfig("embedding.hash_dim must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Embedding backend, selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EmbeddingBackend {
    /// Local BGE-M3 model loaded from `embedding.model_dir`.
    HuggingFace,
    /// TogetherAI embeddings API.
    TogetherAi,
    /// Deterministic token hashing; no model, for tests and offline development.
    Hash,
}

impl FromStr for EmbeddingBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "huggingface" | "hf" | "local" => Ok(EmbeddingBackend::HuggingFace),
            "togetherai" | "together" | "remote" => Ok(EmbeddingBackend::TogetherAi),
            "hash" | "fake" => Ok(EmbeddingBackend::Hash),
            other => Err(Error::InvalidConfig(format!(
                "unknown embedding backend '{other}' (expected 'huggingface', 'togetherai' or 'hash')"
            ))),
        }
    }
}

impl TryFrom<String> for EmbeddingBackend {
    type Error = Error;
    fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<EmbeddingBackend> for String {
    fn from(b: EmbeddingBackend) -> Self { b.to_string() }
}

impl fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmbeddingBackend::HuggingFace => "huggingface",
            EmbeddingBackend::TogetherAi => "togetherai",
            EmbeddingBackend::Hash => "hash",
        })
    }
}

/// Summarization backend, selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LlmBackend {
    /// `ollama run <model>` as a local child process.
    Ollama,
    /// TogetherAI chat completions API.
    TogetherAi,
}

impl FromStr for LlmBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" | "local" => Ok(LlmBackend::Ollama),
            "togetherai" | "together" | "remote" => Ok(LlmBackend::TogetherAi),
            other => Err(Error::InvalidConfig(format!(
                "unknown LLM backend '{other}' (expected 'ollama' or 'togetherai')"
            ))),
        }
    }
}

impl TryFrom<String> for LlmBackend {
    type Error = Error;
    fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<LlmBackend> for String {
    fn from(b: LlmBackend) -> Self { b.to_string() }
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LlmBackend::Ollama => "ollama",
            LlmBackend::TogetherAi => "togetherai",
        })
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
