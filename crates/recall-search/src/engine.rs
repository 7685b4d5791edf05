use std::sync::Arc;
use tracing::{debug, info, warn};

use recall_core::config::Thresholds;
use recall_core::error::Result;
use recall_core::{SearchOutcome, SimilarityMode, SummaryLength};
use recall_embed::EmbeddingProvider;
use recall_vector::IndexStore;

use crate::gateway::SummaryGateway;
use crate::policy::{decide, pick_candidate, retrieval_filter, Decision};

/// Embeds a query, searches the persisted index and applies the threshold policy.
///
/// Missing index, failed embedding or failed search all yield `NoMatch`. A
/// failed chunk summary degrades to the query fallback; only a failed fallback
/// is returned as an error.
pub struct SearchEngine {
    provider: EmbeddingProvider,
    store: IndexStore,
    gateway: Arc<SummaryGateway>,
    top_k: usize,
    thresholds: Thresholds,
}

impl SearchEngine {
    pub fn new(
        provider: EmbeddingProvider,
        store: IndexStore,
        gateway: Arc<SummaryGateway>,
        top_k: usize,
        thresholds: Thresholds,
    ) -> Self {
        Self { provider, store, gateway, top_k, thresholds }
    }

    pub fn mode(&self) -> SimilarityMode { self.provider.mode() }

    pub fn provider(&self) -> &EmbeddingProvider { &self.provider }

    pub fn store(&self) -> &IndexStore { &self.store }

    pub fn search(&self, query: &str) -> Result<SearchOutcome> {
        let mode = self.mode();
        let index = match self.store.load_for(mode) {
            Ok(index) => index,
            Err(e) => {
                warn!("No usable index: {}", e);
                return Ok(SearchOutcome::NoMatch);
            }
        };
        let vector = match self.provider.embed(query) {
            Ok(v) => v,
            Err(e) => {
                warn!("Query embedding failed: {}", e);
                return Ok(SearchOutcome::NoMatch);
            }
        };
        let hits = match index.search(&vector, self.top_k) {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Index search failed: {}", e);
                return Ok(SearchOutcome::NoMatch);
            }
        };
        debug!("Raw hits: {:?}", hits.iter().map(|h| (h.position, h.score)).collect::<Vec<_>>());

        let survivors = retrieval_filter(mode, &self.thresholds, hits);
        let Some(candidate) = pick_candidate(mode, &survivors) else {
            info!("No hit passed the {} retrieval cut-off", mode);
            return self.fallback(query);
        };
        info!("Candidate chunk {} scored {} ({} mode)", candidate.position, candidate.score, mode);

        match decide(mode, candidate.score, &self.thresholds) {
            Decision::Direct => Ok(SearchOutcome::DirectMatch(candidate.chunk.clone())),
            Decision::Summarize => match self.gateway.summarize(&candidate.chunk, &SummaryLength::MEDIUM) {
                Ok(summary) => Ok(SearchOutcome::SummarizedMatch(summary)),
                Err(e) => {
                    warn!("Summarizing chunk {} failed, falling back to the query: {}", candidate.position, e);
                    self.fallback(query)
                }
            },
            Decision::Ambiguous => self.fallback(query),
        }
    }

    fn fallback(&self, query: &str) -> Result<SearchOutcome> {
        self.gateway.summarize(query, &SummaryLength::SHORT).map(SearchOutcome::FallbackSummary)
    }
}
