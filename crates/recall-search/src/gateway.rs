use std::time::Instant;
use tracing::{debug, info, warn};

use recall_cache::{summary_key, ResponseCache};
use recall_core::error::Result;
use recall_core::traits::Summarizer;
use recall_core::SummaryLength;

/// Cache-fronted access to the summarization backend.
///
/// Short inputs come back unchanged; everything else is looked up in the
/// cache first and written back after a successful backend call.
pub struct SummaryGateway {
    summarizer: Box<dyn Summarizer>,
    cache: ResponseCache,
    min_words: usize,
}

impl SummaryGateway {
    pub fn new(summarizer: Box<dyn Summarizer>, cache: ResponseCache, min_words: usize) -> Self {
        Self { summarizer, cache, min_words }
    }

    pub fn cache(&self) -> &ResponseCache { &self.cache }

    pub fn summarize(&self, text: &str, length: &SummaryLength) -> Result<String> {
        if text.split_whitespace().count() <= self.min_words {
            debug!("Input has at most {} words; returning it unsummarized", self.min_words);
            return Ok(text.to_string());
        }

        let key = summary_key(text, length);
        match self.cache.get(&key) {
            Ok(Some(hit)) => {
                debug!("Summary cache hit ({})", length);
                return Ok(hit);
            }
            Ok(None) => {}
            Err(e) => warn!("Summary cache read failed, treating as miss: {}", e),
        }

        let start = Instant::now();
        let summary = self.summarizer.summarize(text, length)?;
        info!("{} produced a {} summary in {:?}", self.summarizer.name(), length, start.elapsed());

        if let Err(e) = self.cache.put(&key, &summary) {
            warn!("Failed to cache summary: {}", e);
        }
        Ok(summary)
    }
}
