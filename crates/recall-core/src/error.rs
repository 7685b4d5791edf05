use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Cache write failed: {0}")]
    CacheWrite(String),

    #[error("Summarization failed: {0}")]
    Summarize(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// True for the conditions a query treats as "there is no usable index".
    pub fn is_index_missing(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::IndexUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
