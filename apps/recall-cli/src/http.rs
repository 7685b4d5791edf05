//! HTTP surface: `GET /search` and `POST /summarize`.
//!
//! Core calls are blocking, so every handler hands them to Tokio's blocking pool.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use recall_search::{ApiError, Service, SummarizeRequest};

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: Option<String>,
}

fn error_response(e: &ApiError) -> Response {
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": e.message() }))).into_response()
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    error!("Request task failed: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "internal error" }))).into_response()
}

async fn search(State(service): State<Arc<Service>>, Query(params): Query<SearchParams>) -> Response {
    match tokio::task::spawn_blocking(move || service.query(params.query.as_deref())).await {
        Ok(Ok(body)) => Json(body).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => internal_error(e),
    }
}

async fn summarize(State(service): State<Arc<Service>>, body: Bytes) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        SummarizeRequest::default()
    } else {
        match serde_json::from_slice::<SummarizeRequest>(&body) {
            Ok(r) => r,
            Err(e) => return error_response(&ApiError::BadRequest(format!("Invalid JSON body: {e}"))),
        }
    };
    match tokio::task::spawn_blocking(move || service.summarize(request)).await {
        Ok(Ok(body)) => Json(body).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => internal_error(e),
    }
}

pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/summarize", post(summarize))
        .with_state(service)
}
