//! Fetch-merge pipeline for npofeed.
//!
//! This module reconciles the remote paginated listing with the local
//! cache, refreshes every known feed, and runs that refresh periodically.

pub mod discovery;
pub mod merge;
pub mod sync;
pub mod updater;

pub use discovery::RefreshReport;
pub use merge::merge_broadcasts;
pub use sync::{BroadcastSync, SyncMode, SyncOutcome, DEFAULT_MAX_PAGES};
pub use updater::{start_feed_updater, FeedUpdater, DEFAULT_REFRESH_INTERVAL_SECS};
