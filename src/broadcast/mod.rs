//! Broadcast data model.
//!
//! Records, remote pages and the `(channel, programme)` cache key.

pub mod types;

pub use types::{AudioAsset, BroadcastPage, BroadcastRecord, ChannelProgramme, ProgrammeInfo};
