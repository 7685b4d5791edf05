//! Summarization backends.

pub mod ollama;
pub mod together;

use std::time::Duration;
use tracing::info;

use recall_core::config::{LlmBackend, Settings};
use recall_core::error::Result;
use recall_core::traits::Summarizer;

pub use ollama::OllamaSummarizer;
pub use together::{parse_chat_response, TogetherSummarizer};

/// Resolve the configured backend once at startup.
pub fn build_summarizer(settings: &Settings) -> Result<Box<dyn Summarizer>> {
    let llm = &settings.llm;
    let timeout = Duration::from_secs(llm.timeout_secs);
    let summarizer: Box<dyn Summarizer> = match llm.backend {
        LlmBackend::Ollama => Box::new(OllamaSummarizer::new(&llm.ollama_bin, &llm.ollama_model, timeout)),
        LlmBackend::TogetherAi => Box::new(TogetherSummarizer::new(
            &settings.together.base_url,
            settings.together.require_key()?,
            &llm.together_model,
            llm.max_tokens,
            timeout,
        )?),
    };
    info!("Summarization backend: {}", summarizer.name());
    Ok(summarizer)
}
