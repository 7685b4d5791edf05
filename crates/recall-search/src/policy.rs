//! Threshold policy applied to nearest-neighbour hits.
//!
//! All comparisons are strict, so a score sitting exactly on `accept` or
//! `summarize` lands in the ambiguous band.

use recall_core::config::Thresholds;
use recall_core::{SearchHit, SimilarityMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Return the chunk verbatim.
    Direct,
    /// Return a summary of the chunk.
    Summarize,
    /// Neither; summarize the query instead.
    Ambiguous,
}

/// Drop hits that fail the retrieval cut-off, keeping rank order.
pub fn retrieval_filter(mode: SimilarityMode, t: &Thresholds, hits: Vec<SearchHit>) -> Vec<SearchHit> {
    hits.into_iter()
        .filter(|h| match mode {
            SimilarityMode::Cosine => h.score > t.retrieval,
            SimilarityMode::Euclidean => h.score < t.retrieval,
        })
        .collect()
}

/// The hit the decision is made on.
pub fn pick_candidate(mode: SimilarityMode, survivors: &[SearchHit]) -> Option<&SearchHit> {
    match mode {
        SimilarityMode::Cosine => survivors.first(),
        // Euclidean decides on the farthest survivor, not the nearest. Kept as-is; see DESIGN.md.
        SimilarityMode::Euclidean => survivors.last(),
    }
}

pub fn decide(mode: SimilarityMode, score: f32, t: &Thresholds) -> Decision {
    match mode {
        SimilarityMode::Cosine if score > t.accept => Decision::Direct,
        SimilarityMode::Cosine if score < t.summarize => Decision::Summarize,
        SimilarityMode::Euclidean if score < t.accept => Decision::Direct,
        SimilarityMode::Euclidean if score > t.summarize => Decision::Summarize,
        _ => Decision::Ambiguous,
    }
}
