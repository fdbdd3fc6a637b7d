//! Feed handlers.

use axum::{
    extract::{Path, RawQuery, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::broadcast::ChannelProgramme;
use crate::feed::{render_cached, FeedRequest};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Content type of rendered feeds.
pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=UTF-8";

/// GET /feeds/:channel/:programme - Render a cached feed as RSS.
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    Path((channel, programme)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let key = ChannelProgramme::new(channel, programme).map_err(|e| {
        tracing::debug!("Rejected feed key: {}", e);
        ApiError::not_found("Feed not found")
    })?;

    let self_url = state.feed_url(&key.channel, &key.programme, query.as_deref());
    let request = FeedRequest {
        key: &key,
        self_url: &self_url,
        site_url: &state.base_url,
        language: &state.language,
    };

    let xml = render_cached(state.store.as_ref(), &request)?;
    tracing::debug!("Rendered feed {} ({} bytes)", key, xml.len());

    Ok(([(header::CONTENT_TYPE, RSS_CONTENT_TYPE)], xml).into_response())
}

/// GET /health - Liveness check.
pub async fn health_check() -> &'static str {
    "OK"
}
