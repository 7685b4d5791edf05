//! Query answering: retrieval policy, summary gateway and the JSON-facing service.

pub mod engine;
pub mod gateway;
pub mod policy;
pub mod service;

pub use engine::SearchEngine;
pub use gateway::SummaryGateway;
pub use policy::Decision;
pub use service::{ApiError, QueryResponse, Service, SummarizeRequest, SummarizeResponse};
