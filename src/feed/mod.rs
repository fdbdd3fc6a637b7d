//! RSS feed rendering.
//!
//! Projects a cached broadcast collection into an RSS 2.0 podcast document.

pub mod format;
pub mod render;

pub use format::{
    cdata_sections, format_duration, format_rfc2822, item_guid, parse_datetime, xml_text,
};
pub use render::{render_feed, ChannelInfo, FeedRequest};

use crate::cache::BroadcastStore;
use crate::error::{FeedError, Result};

/// Render the feed for a cached key.
///
/// A missing entry and an entry that normalizes to no records are both
/// [`FeedError::NotFound`].
pub fn render_cached(store: &dyn BroadcastStore, request: &FeedRequest<'_>) -> Result<String> {
    if !store.exists(request.key) {
        return Err(FeedError::NotFound(format!("feed {}", request.key)));
    }
    render_feed(request, &store.read(request.key))
}
