//! Error types for searches and downloads

use thiserror::Error;

/// Failure of a single page retrieval
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}")]
    Status { status: u16 },
}

/// Errors surfaced to the caller of `search` / `download`
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("{provider} does not support category '{category}'")]
    UnsupportedCategory { provider: String, category: String },

    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("invalid provider definition: {0}")]
    InvalidProvider(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
