//! Response headers middleware.

use axum::{
    body::Body,
    http::{header::HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Caching policy for feed responses without one of their own.
///
/// Feeds change at most once per refresh cycle.
const DEFAULT_CACHE_CONTROL: &str = "public, max-age=300";

/// Feed headers middleware.
///
/// Adds the following headers to all responses:
/// - X-Content-Type-Options: nosniff
/// - Referrer-Policy: no-referrer
/// - Cache-Control: public, max-age=300 (successful responses only, unless set)
pub async fn feed_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let success = response.status().is_success();
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));

    if !headers.contains_key("Cache-Control") {
        let value = if success {
            DEFAULT_CACHE_CONTROL
        } else {
            "no-store"
        };
        headers.insert("Cache-Control", HeaderValue::from_static(value));
    }

    response
}
