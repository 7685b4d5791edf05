use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use recall_core::error::{Error, Result};
use recall_core::traits::{summary_prompt, Summarizer};
use recall_core::SummaryLength;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

/// TogetherAI chat-completions client used for summaries.
pub struct TogetherSummarizer {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    name: String,
}

impl TogetherSummarizer {
    pub fn new(base_url: &str, api_key: &str, model: &str, max_tokens: u32, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
            name: format!("togetherai:{model}"),
        })
    }
}

impl Summarizer for TogetherSummarizer {
    fn name(&self) -> &str { &self.name }

    fn summarize(&self, text: &str, length: &SummaryLength) -> Result<String> {
        let prompt = summary_prompt(text, length);
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "user", content: &prompt }],
            max_tokens: self.max_tokens,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| Error::Summarize(format!("TogetherAI request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .map_err(|e| Error::Summarize(format!("TogetherAI returned a non-JSON body ({status}): {e}")))?;
        if !status.is_success() {
            warn!("TogetherAI chat completions returned {}", status);
        }
        debug!("TogetherAI chat response status {}", status);
        parse_chat_response(&body)
    }
}

/// Extract `choices[0].message.content`, or surface the API's error message.
pub fn parse_chat_response(body: &Value) -> Result<String> {
    if let Some(choice) = body.get("choices").and_then(Value::as_array).and_then(|c| c.first()) {
        let content = choice
            .pointer("/message/content")
            .and_then(Value::as_str)
            .map(str::trim)
            .ok_or_else(|| Error::Summarize("choice has no message content".to_string()))?;
        if content.is_empty() {
            return Err(Error::Summarize("model returned an empty summary".to_string()));
        }
        return Ok(content.to_string());
    }
    if let Some(err) = body.get("error") {
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(Error::Summarize(format!("TogetherAI API error: {message}")));
    }
    Err(Error::Summarize(format!("unexpected chat response: {body}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reads_first_choice_content() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "  A short summary. "}}]});
        assert_eq!(parse_chat_response(&body).unwrap(), "A short summary.");
    }

    #[test]
    fn request_body_matches_chat_schema() {
        let request = ChatRequest {
            model: "m",
            messages: [ChatMessage { role: "user", content: "p" }],
            max_tokens: 300,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"model": "m", "messages": [{"role": "user", "content": "p"}], "max_tokens": 300})
        );
    }

    #[test]
    fn errors_and_malformed_payloads_fail() {
        let err = parse_chat_response(&json!({"error": {"message": "rate limited"}})).unwrap_err();
        assert!(err.to_string().contains("rate limited"));
        for body in [
            json!({"choices": []}),
            json!({"choices": [{"message": {}}]}),
            json!({"choices": [{"message": {"content": "   "}}]}),
            json!({}),
        ] {
            assert!(matches!(parse_chat_response(&body), Err(Error::Summarize(_))), "{body}");
        }
    }
}
