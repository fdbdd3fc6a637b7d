//! Middleware for the feed server.

pub mod security;

pub use security::feed_headers;
