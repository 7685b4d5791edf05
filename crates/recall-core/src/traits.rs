use crate::error::Result;
use crate::types::SummaryLength;

/// Turns text into a vector. Implementations return the raw model output;
/// normalization is applied by the embedding provider according to the mode.
pub trait Embedder: Send + Sync {
    /// Stable identifier for logs and status output (e.g. `togetherai:<model>`).
    fn name(&self) -> &str;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Condenses text to a requested length.
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;
    fn summarize(&self, text: &str, length: &SummaryLength) -> Result<String>;
}

/// Prompt sent to every summarization backend.
pub fn summary_prompt(text: &str, length: &SummaryLength) -> String {
    format!("Summarize the following text in a {} length:\n\n{}", length.as_str(), text)
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn name(&self) -> &str { (**self).name() }
    fn embed(&self, text: &str) -> Result<Vec<f32>> { (**self).embed(text) }
}

impl<T: Summarizer + ?Sized> Summarizer for Box<T> {
    fn name(&self) -> &str { (**self).name() }
    fn summarize(&self, text: &str, length: &SummaryLength) -> Result<String> { (**self).summarize(text, length) }
}
