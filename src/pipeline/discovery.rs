//! Discovery job: refresh every known feed.

use std::collections::BTreeSet;

use tracing::{error, info, warn};

use crate::broadcast::ChannelProgramme;
use crate::pipeline::sync::{BroadcastSync, SyncOutcome};

/// Summary of one discovery run.
#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Keys synced successfully.
    pub refreshed: Vec<(ChannelProgramme, SyncOutcome)>,
    /// Keys whose sync failed, with the reason.
    pub failed: Vec<(ChannelProgramme, String)>,
}

impl RefreshReport {
    /// Whether every key was synced.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl BroadcastSync {
    /// Keys to refresh: the seeds plus every key already cached.
    ///
    /// A failure to enumerate the cache is logged and only the seeds are
    /// returned.
    pub fn discover(&self, seeds: &[ChannelProgramme]) -> Vec<ChannelProgramme> {
        let mut keys: BTreeSet<ChannelProgramme> = seeds.iter().cloned().collect();

        match self.store().list_keys() {
            Ok(cached) => keys.extend(cached),
            Err(e) => error!("Failed to list cached feeds: {}", e),
        }

        keys.into_iter().collect()
    }

    /// Sync every discovered key, one after another.
    ///
    /// A failing key is recorded and skipped; it never stops the run.
    pub async fn refresh_all(&self, seeds: &[ChannelProgramme]) -> RefreshReport {
        let keys = self.discover(seeds);
        info!("Refreshing {} feed(s)", keys.len());

        let mut report = RefreshReport::default();
        for key in keys {
            match self.sync(&key).await {
                Ok(outcome) => report.refreshed.push((key, outcome)),
                Err(e) => {
                    warn!("Failed to refresh {}: {}", key, e);
                    report.failed.push((key, e.to_string()));
                }
            }
        }

        info!(
            "Refresh finished: {} succeeded, {} failed",
            report.refreshed.len(),
            report.failed.len()
        );
        report
    }
}
