//! Decoding of cached broadcast payloads.
//!
//! The on-disk format has changed over time. Three shapes are recognised and
//! tried in a fixed order; anything else decodes to an empty collection.
//!
//! ```text
//! Envelope  {"data": {"radio_broadcasts": {"data": [...]}}}
//! Keyed     {"broadcasts": [...]}
//! List      [...]
//! ```

use serde_json::Value;
use tracing::warn;

use crate::broadcast::BroadcastRecord;

/// Recognised layouts of a cached payload, in decoding priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheShape {
    /// A raw GraphQL response envelope.
    Envelope,
    /// An object holding the list under `broadcasts`.
    Keyed,
    /// A bare JSON array (the format written today).
    List,
}

/// A payload reduced to its record list.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPayload {
    /// Which layout matched.
    pub shape: CacheShape,
    /// Records in stored order; non-object entries are dropped.
    pub records: Vec<BroadcastRecord>,
}

impl DecodedPayload {
    /// Try each shape in priority order.
    pub fn decode(mut payload: Value) -> Option<Self> {
        let (shape, items) =
            if let Some(Value::Array(items)) = payload.pointer_mut("/data/radio_broadcasts/data") {
                (CacheShape::Envelope, std::mem::take(items))
            } else if let Some(Value::Array(items)) = payload.get_mut("broadcasts") {
                (CacheShape::Keyed, std::mem::take(items))
            } else if let Value::Array(items) = payload {
                (CacheShape::List, items)
            } else {
                return None;
            };

        let records = items
            .into_iter()
            .filter_map(BroadcastRecord::from_value)
            .collect();

        Some(Self { shape, records })
    }
}

/// Reduce any recognised payload to a flat record list.
///
/// Unrecognised payloads yield an empty list.
pub fn normalize(payload: Value) -> Vec<BroadcastRecord> {
    DecodedPayload::decode(payload)
        .map(|decoded| decoded.records)
        .unwrap_or_default()
}

/// Decode raw cache bytes; invalid JSON yields an empty list.
pub fn normalize_bytes(bytes: &[u8]) -> Vec<BroadcastRecord> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(payload) => normalize(payload),
        Err(e) => {
            warn!("Ignoring cache payload that is not valid JSON: {}", e);
            Vec::new()
        }
    }
}
