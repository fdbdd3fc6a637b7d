//! Request handlers for the feed server.

pub mod feed;

pub use feed::*;

use std::sync::Arc;

use crate::cache::BroadcastStore;

/// Shared state of the feed server.
#[derive(Clone)]
pub struct AppState {
    /// Cache the feeds are rendered from.
    pub store: Arc<dyn BroadcastStore>,
    /// Public base URL, without a trailing slash.
    pub base_url: String,
    /// Channel language of rendered feeds.
    pub language: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: Arc<dyn BroadcastStore>, base_url: &str, language: &str) -> Self {
        Self {
            store,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
        }
    }

    /// Public URL of a feed, carrying the request's query string if any.
    pub fn feed_url(&self, channel: &str, programme: &str, query: Option<&str>) -> String {
        let url = format!("{}/feeds/{}/{}", self.base_url, channel, programme);
        match query {
            Some(query) if !query.is_empty() => format!("{url}?{query}"),
            _ => url,
        }
    }
}
