pub mod config;
pub mod data_processor;
pub mod error;
pub mod pdf;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{SearchHit, SearchOutcome, SimilarityMode, SummaryLength};
