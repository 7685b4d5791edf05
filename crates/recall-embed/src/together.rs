use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use recall_core::error::{Error, Result};
use recall_core::traits::Embedder;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// TogetherAI `/embeddings` client.
pub struct TogetherEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    name: String,
}

impl TogetherEmbedder {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
            name: format!("togetherai:{model}"),
        })
    }
}

impl Embedder for TogetherEmbedder {
    fn name(&self) -> &str { &self.name }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest { model: &self.model, input: text };
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| Error::Embedding(format!("TogetherAI request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .map_err(|e| Error::Embedding(format!("TogetherAI returned a non-JSON body ({status}): {e}")))?;
        if !status.is_success() {
            warn!("TogetherAI embeddings returned {}", status);
        }
        debug!("TogetherAI embedding response status {}", status);
        parse_embedding_response(&body)
    }
}

/// Pull `data[0].embedding` out of an embeddings response, or report the
/// API's `error.message`.
pub fn parse_embedding_response(body: &Value) -> Result<Vec<f32>> {
    if let Some(first) = body.get("data").and_then(Value::as_array).and_then(|d| d.first()) {
        let values = first
            .get("embedding")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Embedding("embedding is missing or not a list".to_string()))?;
        return values
            .iter()
            .map(|v| v.as_f64().map(|x| x as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| Error::Embedding("embedding contains non-numeric values".to_string()));
    }
    if let Some(err) = body.get("error") {
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(Error::Embedding(format!("TogetherAI API error: {message}")));
    }
    Err(Error::Embedding(format!("unexpected embeddings response: {body}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_first_embedding() {
        let body = json!({"data": [{"embedding": [0.5, -1.0, 2]}, {"embedding": [9.0]}]});
        assert_eq!(parse_embedding_response(&body).unwrap(), vec![0.5, -1.0, 2.0]);
    }

    #[test]
    fn api_error_message_is_reported() {
        let body = json!({"error": {"message": "invalid api key"}});
        let err = parse_embedding_response(&body).unwrap_err();
        assert!(err.to_string().contains("invalid api key"), "{err}");
    }

    #[test]
    fn malformed_payloads_are_embedding_errors() {
        for body in [
            json!({"data": []}),
            json!({"data": [{"embedding": "nope"}]}),
            json!({"data": [{"embedding": [1.0, "x"]}]}),
            json!({"object": "list"}),
        ] {
            assert!(matches!(parse_embedding_response(&body), Err(Error::Embedding(_))), "{body}");
        }
    }
}
