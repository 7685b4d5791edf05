mod common;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::{fixture, gateway, long_text};
use recall_core::error::Error;
use recall_core::{SimilarityMode, SummaryLength};
use recall_search::{ApiError, SummarizeRequest};

#[test]
fn short_text_bypasses_cache_and_backend() {
    let dir = tempfile::tempdir().unwrap();
    let (gw, calls) = gateway(dir.path(), false);
    let text = "just a few words here";
    assert_eq!(gw.summarize(text, &SummaryLength::LONG).unwrap(), text);
    assert!(calls.lock().unwrap().is_empty());
    assert_eq!(gw.cache().len().unwrap(), 0);
}

#[test]
fn exactly_min_words_is_still_bypassed() {
    let dir = tempfile::tempdir().unwrap();
    let (gw, calls) = gateway(dir.path(), false);
    let text = (0..30).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
    assert_eq!(gw.summarize(&text, &SummaryLength::SHORT).unwrap(), text);
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn repeated_summaries_hit_the_backend_once() {
    let dir = tempfile::tempdir().unwrap();
    let (gw, calls) = gateway(dir.path(), false);
    let text = long_text("repeat");
    let first = gw.summarize(&text, &SummaryLength::MEDIUM).unwrap();
    let second = gw.summarize(&text, &SummaryLength::MEDIUM).unwrap();
    assert_eq!(first, second);
    assert_eq!(calls.lock().unwrap().len(), 1);

    gw.summarize(&text, &SummaryLength::SHORT).unwrap();
    assert_eq!(calls.lock().unwrap().len(), 2, "length is part of the cache key");
    assert_eq!(gw.cache().len().unwrap(), 2);
}

#[test]
fn backend_failures_are_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let (gw, calls) = gateway(dir.path(), true);
    let text = long_text("fail");
    assert!(matches!(gw.summarize(&text, &SummaryLength::MEDIUM), Err(Error::Summarize(_))));
    assert!(matches!(gw.summarize(&text, &SummaryLength::MEDIUM), Err(Error::Summarize(_))));
    assert_eq!(calls.lock().unwrap().len(), 2);
    assert_eq!(gw.cache().len().unwrap(), 0);
}

#[test]
fn query_requires_a_non_blank_parameter() {
    let dir = tempfile::tempdir().unwrap();
    let fx = fixture(dir.path(), SimilarityMode::Cosine, &[], &[], false);
    for q in [None, Some(""), Some("   ")] {
        let err = fx.service.query(q).unwrap_err();
        assert_eq!(err, ApiError::BadRequest("Query parameter is required".to_string()));
        assert_eq!(err.status_code(), 400);
    }
}

#[test]
fn summarize_requires_text() {
    let dir = tempfile::tempdir().unwrap();
    let fx = fixture(dir.path(), SimilarityMode::Cosine, &[], &[], false);
    let missing = fx.service.summarize(SummarizeRequest::default()).unwrap_err();
    assert_eq!(missing, ApiError::BadRequest("Missing required 'text' field".to_string()));
    assert_eq!(missing.status_code(), 400);
}

#[test]
fn summarize_accepts_any_length_label() {
    let dir = tempfile::tempdir().unwrap();
    let fx = fixture(dir.path(), SimilarityMode::Cosine, &[], &[], false);
    let text = long_text("doc");
    let brief = SummarizeRequest { text: Some(text.clone()), length: Some("brief".to_string()) };
    let resp = fx.service.summarize(brief).unwrap();
    assert_eq!(resp.summary, "brief summary of 40 words");

    let medium = SummarizeRequest { text: Some(text.clone()), length: Some("medium".to_string()) };
    fx.service.summarize(medium).unwrap();
    let calls = fx.calls.lock().unwrap().clone();
    assert_eq!(calls, vec![(text.clone(), SummaryLength::new("brief")), (text, SummaryLength::MEDIUM)]);
}

#[test]
fn summarize_defaults_to_medium() {
    let dir = tempfile::tempdir().unwrap();
    let fx = fixture(dir.path(), SimilarityMode::Cosine, &[], &[], false);
    let req: SummarizeRequest = serde_json::from_value(json!({"text": long_text("doc")})).unwrap();
    let resp = fx.service.summarize(req).unwrap();
    assert_eq!(serde_json::to_value(&resp).unwrap(), json!({"summary": "medium summary of 40 words"}));
    assert_eq!(fx.calls.lock().unwrap()[0].1, SummaryLength::MEDIUM);
}
