//! Error types for npofeed.

use thiserror::Error;

/// Common error type for npofeed.
///
/// Malformed cache payloads and unparseable dates never surface here: they
/// are absorbed where they occur and degrade to an empty collection or an
/// omitted element.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The remote GraphQL API could not be reached or returned garbage.
    ///
    /// Covers transport errors, timeouts, non-2xx statuses and bodies that
    /// are not JSON.
    #[error("remote fetch failed: {0}")]
    Remote(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error while writing the cache.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// XML writer error while rendering a feed.
    #[error("XML error: {0}")]
    Xml(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FeedError::Remote(format!("request timed out: {e}"))
        } else {
            FeedError::Remote(e.to_string())
        }
    }
}

/// Result type alias for npofeed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
