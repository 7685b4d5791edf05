//! Domain types shared by the index, cache and search crates.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Metric an index is built with and queried under.
///
/// Cosine stores unit vectors and ranks by inner product (higher is better);
/// euclidean stores raw vectors and ranks by squared distance (lower is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SimilarityMode {
    Cosine,
    #[default]
    Euclidean,
}

impl SimilarityMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SimilarityMode::Cosine => "cosine",
            SimilarityMode::Euclidean => "euclidean",
        }
    }
}

impl FromStr for SimilarityMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(SimilarityMode::Cosine),
            "euclidean" | "l2" => Ok(SimilarityMode::Euclidean),
            other => Err(Error::InvalidConfig(format!(
                "unknown similarity mode '{other}' (expected 'cosine' or 'euclidean')"
            ))),
        }
    }
}

impl TryFrom<String> for SimilarityMode {
    type Error = Error;
    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<SimilarityMode> for String {
    fn from(m: SimilarityMode) -> Self { m.as_str().to_string() }
}

impl fmt::Display for SimilarityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Requested output shape of a summary, e.g. `short` or `medium`.
///
/// Any non-blank label is accepted and passed through to the prompt as given;
/// a blank label means `medium`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SummaryLength(Cow<'static, str>);

impl SummaryLength {
    pub const SHORT: SummaryLength = SummaryLength(Cow::Borrowed("short"));
    pub const MEDIUM: SummaryLength = SummaryLength(Cow::Borrowed("medium"));
    pub const LONG: SummaryLength = SummaryLength(Cow::Borrowed("long"));

    pub fn new(label: &str) -> Self {
        match label.trim() {
            "" => Self::MEDIUM,
            l => SummaryLength(Cow::Owned(l.to_string())),
        }
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl Default for SummaryLength {
    fn default() -> Self { Self::MEDIUM }
}

impl From<&str> for SummaryLength {
    fn from(s: &str) -> Self { Self::new(s) }
}

impl From<String> for SummaryLength {
    fn from(s: String) -> Self { Self::new(&s) }
}

impl From<SummaryLength> for String {
    fn from(l: SummaryLength) -> Self { l.0.into_owned() }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// One nearest-neighbour result.
///
/// `position` indexes the chunk sequence the index was built from. `score` is
/// metric-native: similarity for cosine, squared distance for euclidean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub position: usize,
    pub chunk: String,
    pub score: f32,
}

/// What a query resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The retrieved chunk, verbatim.
    DirectMatch(String),
    /// A summary of the retrieved chunk.
    SummarizedMatch(String),
    /// A summary of the query itself; no retrieved chunk was trustworthy.
    FallbackSummary(String),
    /// No index or no query embedding; the caller falls back to the raw query.
    NoMatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn similarity_mode_parses_case_insensitively() {
        assert_eq!("Euclidean".parse::<SimilarityMode>().unwrap(), SimilarityMode::Euclidean);
        assert_eq!(" COSINE ".parse::<SimilarityMode>().unwrap(), SimilarityMode::Cosine);
        assert!(matches!("manhattan".parse::<SimilarityMode>(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn summary_length_is_a_free_form_label() {
        assert_eq!(SummaryLength::default(), SummaryLength::MEDIUM);
        assert_eq!(SummaryLength::new("  "), SummaryLength::MEDIUM);
        assert_eq!(SummaryLength::new(" short "), SummaryLength::SHORT);
        assert_eq!(SummaryLength::new("brief").as_str(), "brief");
        assert_eq!(SummaryLength::from("two sentences".to_string()).to_string(), "two sentences");
    }
}
