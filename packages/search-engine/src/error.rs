//! Typed errors for the search engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match on
//! what failed. None of these cross the public `search` boundary: the
//! coordinator folds them into the response envelope.

use thiserror::Error;

use crate::types::query::SourceId;

/// Umbrella error for search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A source adapter failed
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// The upstream search API failed
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// The result cache failed
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Query could not be built
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Errors raised by a single source adapter.
///
/// The orchestrator treats all of these as soft failures.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Site answered with a non-success status
    #[error("{source_id} returned HTTP {status}")]
    Status { source_id: SourceId, status: u16 },

    /// Response body could not be parsed
    #[error("failed to parse {source_id} response: {reason}")]
    Parse { source_id: SourceId, reason: String },

    /// Adapter needs credentials that were not configured
    #[error("{source_id} is not configured: {reason}")]
    ConfigMissing { source_id: SourceId, reason: String },

    /// Fetch exceeded its time budget
    #[error("{source_id} timed out")]
    Timeout { source_id: SourceId },
}

/// Errors raised by the upstream search API client.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Upstream answered with a non-success status
    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    /// Payload did not match the expected shape
    #[error("malformed upstream payload: {0}")]
    MalformedPayload(String),

    /// No credentials for this path
    #[error("upstream credentials missing")]
    ConfigMissing,

    /// A single call exceeded its timeout
    #[error("upstream call timed out")]
    Timeout,

    /// Offset beyond what the upstream serves
    #[error("upstream offset {start} out of range")]
    OffsetOutOfRange { start: u32 },
}

/// Errors raised by a result cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Payload could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::Http(Box::new(e))
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Http(Box::new(e))
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::Storage(Box::new(e))
    }
}

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Result type alias for source adapter operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Result type alias for upstream operations.
pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

/// Result type alias for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;
