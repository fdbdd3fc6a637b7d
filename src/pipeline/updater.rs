//! Background feed updater.
//!
//! Periodically runs the discovery job while the server is up.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::info;

use crate::broadcast::ChannelProgramme;
use crate::pipeline::sync::BroadcastSync;

/// Default refresh interval in seconds (1 hour).
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;

/// Feed background updater.
pub struct FeedUpdater {
    sync: Arc<BroadcastSync>,
    seeds: Vec<ChannelProgramme>,
    refresh_interval: Duration,
}

impl FeedUpdater {
    /// Create an updater with the default interval.
    pub fn new(sync: Arc<BroadcastSync>, seeds: Vec<ChannelProgramme>) -> Self {
        Self {
            sync,
            seeds,
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
        }
    }

    /// Set the interval between runs.
    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.refresh_interval = Duration::from_secs(interval_secs.max(1));
        self
    }

    /// Run forever; the first refresh starts immediately.
    pub async fn run(&self) {
        info!(
            "Feed updater started (interval: {} seconds, {} seed(s))",
            self.refresh_interval.as_secs(),
            self.seeds.len()
        );

        let mut timer = interval(self.refresh_interval);
        // A slow run must not trigger a burst of catch-up runs
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            self.sync.refresh_all(&self.seeds).await;
        }
    }
}

/// Spawn the updater as a background task.
pub fn start_feed_updater(updater: FeedUpdater) -> JoinHandle<()> {
    tokio::spawn(async move {
        updater.run().await;
    })
}
