//! Router configuration for the feed server.

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{get_feed, health_check, AppState};
use super::middleware::feed_headers;

/// Create the feed router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let feed_routes = Router::new()
        .route("/feeds/:channel/:programme", get(get_feed))
        .layer(middleware::from_fn(feed_headers))
        .with_state(app_state);

    Router::new()
        .merge(feed_routes)
        .merge(create_health_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}
