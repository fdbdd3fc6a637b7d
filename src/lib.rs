//! npofeed - NPO Radio podcast feeds
//!
//! Mirrors broadcast listings from the NPO Radio GraphQL API into a local
//! cache and serves every cached programme as an RSS podcast feed.

pub mod broadcast;
pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod graphql;
pub mod logging;
pub mod pipeline;
pub mod web;

pub use broadcast::{BroadcastPage, BroadcastRecord, ChannelProgramme};
pub use cache::{BroadcastStore, FileBroadcastStore};
pub use config::Config;
pub use error::{FeedError, Result};
pub use feed::{render_feed, FeedRequest};
pub use graphql::BroadcastClient;
pub use pipeline::{merge_broadcasts, BroadcastSync, RefreshReport, SyncMode, SyncOutcome};
pub use web::WebServer;
