use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use recall_core::error::{Error, Result};
use recall_core::{SearchHit, SimilarityMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub vector: Vec<f32>,
    pub chunk: String,
}

/// Flat (brute-force) index. Every entry pairs a vector with its chunk and all
/// vectors share `dim`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    pub mode: SimilarityMode,
    pub dim: usize,
    pub built_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl FlatIndex {
    /// Build from already-embedded entries. Fails on an empty set or mixed dimensions.
    pub fn from_entries(mode: SimilarityMode, entries: Vec<IndexEntry>) -> Result<Self> {
        let dim = entries
            .first()
            .map(|e| e.vector.len())
            .ok_or_else(|| Error::NotFound("no entries to index".to_string()))?;
        if dim == 0 {
            return Err(Error::Operation("index vectors must not be empty".to_string()));
        }
        if let Some(pos) = entries.iter().position(|e| e.vector.len() != dim) {
            return Err(Error::Operation(format!(
                "entry {pos} has dimension {} but the index dimension is {dim}",
                entries[pos].vector.len()
            )));
        }
        Ok(Self { mode, dim, built_at: Utc::now(), entries })
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn chunks(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.chunk.as_str())
    }

    pub fn entries(&self) -> &[IndexEntry] { &self.entries }

    /// Top `top_k` entries for `query`, best first under the index's mode.
    ///
    /// Cosine scores are inner products (vectors are stored unit length);
    /// euclidean scores are squared L2 distances. Ties keep position order.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.dim {
            return Err(Error::Operation(format!(
                "query has dimension {} but the index dimension is {}",
                query.len(),
                self.dim
            )));
        }
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, score(self.mode, query, &e.vector)))
            .collect();
        let mode = self.mode;
        scored.sort_by(|a, b| {
            let by_score = match mode {
                SimilarityMode::Cosine => b.1.total_cmp(&a.1),
                SimilarityMode::Euclidean => a.1.total_cmp(&b.1),
            };
            by_score.then(a.0.cmp(&b.0))
        });
        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(position, score)| SearchHit { position, chunk: self.entries[position].chunk.clone(), score })
            .collect())
    }
}

fn score(mode: SimilarityMode, a: &[f32], b: &[f32]) -> f32 {
    match mode {
        SimilarityMode::Cosine => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        SimilarityMode::Euclidean => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(v: &[f32], chunk: &str) -> IndexEntry {
        IndexEntry { vector: v.to_vec(), chunk: chunk.to_string() }
    }

    #[test]
    fn euclidean_ranks_by_ascending_squared_distance() {
        let idx = FlatIndex::from_entries(
            SimilarityMode::Euclidean,
            vec![entry(&[3.0, 0.0], "far"), entry(&[1.0, 0.0], "near"), entry(&[2.0, 0.0], "mid")],
        )
        .unwrap();
        let hits = idx.search(&[0.0, 0.0], 5).unwrap();
        let order: Vec<&str> = hits.iter().map(|h| h.chunk.as_str()).collect();
        assert_eq!(order, vec!["near", "mid", "far"]);
        assert_eq!(hits[0].score, 1.0);
        assert_eq!(hits[2].score, 9.0);
        assert_eq!(hits[0].position, 1);
    }

    #[test]
    fn cosine_ranks_by_descending_inner_product_and_truncates() {
        let idx = FlatIndex::from_entries(
            SimilarityMode::Cosine,
            vec![entry(&[0.0, 1.0], "orthogonal"), entry(&[1.0, 0.0], "same"), entry(&[-1.0, 0.0], "opposite")],
        )
        .unwrap();
        let hits = idx.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk, "same");
        assert_eq!(hits[1].chunk, "orthogonal");
    }

    #[test]
    fn ties_keep_position_order() {
        let idx = FlatIndex::from_entries(
            SimilarityMode::Euclidean,
            vec![entry(&[1.0], "a"), entry(&[-1.0], "b"), entry(&[1.0], "c")],
        )
        .unwrap();
        let hits = idx.search(&[0.0], 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn wrong_query_dimension_is_an_operation_error() {
        let idx = FlatIndex::from_entries(SimilarityMode::Cosine, vec![entry(&[1.0, 0.0], "a")]).unwrap();
        assert!(matches!(idx.search(&[1.0], 1), Err(Error::Operation(_))));
    }

    #[test]
    fn rejects_empty_and_mixed_dimension_sets() {
        assert!(matches!(FlatIndex::from_entries(SimilarityMode::Cosine, vec![]), Err(Error::NotFound(_))));
        let mixed = vec![entry(&[1.0, 0.0], "a"), entry(&[1.0], "b")];
        assert!(matches!(FlatIndex::from_entries(SimilarityMode::Cosine, mixed), Err(Error::Operation(_))));
    }
}
