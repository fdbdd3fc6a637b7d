//! Broadcast cache for npofeed.
//!
//! This module provides the key-value store holding one broadcast
//! collection per `(channel, programme)` and the shape-tolerant decoder
//! shared by the cache reader and the feed endpoint.

pub mod shape;
pub mod store;

pub use shape::{normalize, normalize_bytes, CacheShape, DecodedPayload};
pub use store::{BroadcastStore, FileBroadcastStore};
