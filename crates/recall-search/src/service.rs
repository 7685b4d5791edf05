//! Request/response shapes shared by the CLI and the HTTP server.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use recall_cache::ResponseCache;
use recall_core::config::Settings;
use recall_core::error::Result;
use recall_core::{SearchOutcome, SummaryLength};
use recall_embed::EmbeddingProvider;
use recall_llm::build_summarizer;
use recall_vector::IndexStore;

use crate::engine::SearchEngine;
use crate::gateway::SummaryGateway;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Results { results: Vec<String> },
    Rephrased { rephrased_summary: String },
    Fallback { fallback_summary: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummarizeRequest {
    pub text: Option<String>,
    pub length: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    BadRequest(String),
    /// The summarization backend failed and there is nothing to degrade to.
    Upstream(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Upstream(_) => 502,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(m) | ApiError::Upstream(m) => m,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.message()) }
}

impl std::error::Error for ApiError {}

pub struct Service {
    engine: SearchEngine,
    gateway: Arc<SummaryGateway>,
}

impl Service {
    pub fn new(engine: SearchEngine, gateway: Arc<SummaryGateway>) -> Self {
        Self { engine, gateway }
    }

    /// Wire every component from `settings`. Backend and key problems surface here.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let provider = EmbeddingProvider::from_settings(settings)?;
        let store = IndexStore::new(settings.paths.index_path());
        let cache = ResponseCache::open(settings.paths.cache_db_path())?;
        let gateway = Arc::new(SummaryGateway::new(build_summarizer(settings)?, cache, settings.llm.min_words));
        let engine = SearchEngine::new(
            provider,
            store,
            Arc::clone(&gateway),
            settings.search.top_k,
            settings.search.thresholds(settings.similarity),
        );
        info!("Service ready ({} mode, index {})", settings.similarity, engine.store().path().display());
        Ok(Self::new(engine, gateway))
    }

    pub fn engine(&self) -> &SearchEngine { &self.engine }

    pub fn query(&self, query: Option<&str>) -> std::result::Result<QueryResponse, ApiError> {
        let query = match query.map(str::trim) {
            Some(q) if !q.is_empty() => q,
            _ => return Err(ApiError::BadRequest("Query parameter is required".to_string())),
        };
        let outcome = self.engine.search(query).map_err(upstream)?;
        Ok(match outcome {
            SearchOutcome::DirectMatch(chunk) => QueryResponse::Results { results: vec![chunk] },
            SearchOutcome::SummarizedMatch(summary) => QueryResponse::Rephrased { rephrased_summary: summary },
            SearchOutcome::FallbackSummary(summary) => QueryResponse::Fallback { fallback_summary: summary },
            SearchOutcome::NoMatch => QueryResponse::Fallback {
                fallback_summary: self.gateway.summarize(query, &SummaryLength::SHORT).map_err(upstream)?,
            },
        })
    }

    pub fn summarize(&self, request: SummarizeRequest) -> std::result::Result<SummarizeResponse, ApiError> {
        let text = request
            .text
            .ok_or_else(|| ApiError::BadRequest("Missing required 'text' field".to_string()))?;
        let length = request.length.as_deref().map(SummaryLength::new).unwrap_or_default();
        let summary = self.gateway.summarize(&text, &length).map_err(upstream)?;
        Ok(SummarizeResponse { summary })
    }
}

fn upstream(e: recall_core::Error) -> ApiError {
    error!("Summarization failed: {}", e);
    ApiError::Upstream(e.to_string())
}
