//! Fetch-merge pipeline.
//!
//! A key without a cache entry is synced from scratch by walking every page
//! of the remote listing (cold start). A key with an entry only fetches the
//! newest page and merges it into what is cached (warm start).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::broadcast::{BroadcastPage, BroadcastRecord, ChannelProgramme};
use crate::cache::BroadcastStore;
use crate::graphql::BroadcastClient;
use crate::pipeline::merge::merge_broadcasts;
use crate::Result;

/// Default ceiling on pages walked during a cold start.
pub const DEFAULT_MAX_PAGES: u32 = 500;

/// How a key was synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// No cache entry existed; the full history was fetched.
    Cold,
    /// A cache entry existed; only the newest page was fetched.
    Warm,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Cold => write!(f, "cold"),
            SyncMode::Warm => write!(f, "warm"),
        }
    }
}

/// Result of one sync of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Which path was taken.
    pub mode: SyncMode,
    /// Pages successfully fetched.
    pub pages: u32,
    /// Records received from the remote.
    pub fetched: usize,
    /// Records in the cache after the merge.
    pub total: usize,
}

/// Per-key mutual exclusion.
///
/// Syncs of the same key are serialized for the whole
/// read, fetch, merge, write sequence; distinct keys never block each other.
/// The locks live in this process only. A `fetch` or `refresh` run must not
/// overlap with a `serve` process updating the same cache, or one of the
/// two merges can be lost.
#[derive(Debug, Default)]
struct KeyedLocks {
    locks: Mutex<HashMap<ChannelProgramme, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyedLocks {
    fn lock_for(&self, key: &ChannelProgramme) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(key.clone()).or_default().clone()
    }
}

/// Keeps cached broadcast collections in step with the remote listing.
pub struct BroadcastSync {
    client: BroadcastClient,
    store: Arc<dyn BroadcastStore>,
    max_pages: u32,
    locks: KeyedLocks,
}

impl BroadcastSync {
    /// Create a pipeline over the given client and store.
    pub fn new(client: BroadcastClient, store: Arc<dyn BroadcastStore>) -> Self {
        Self {
            client,
            store,
            max_pages: DEFAULT_MAX_PAGES,
            locks: KeyedLocks::default(),
        }
    }

    /// Set the page ceiling for cold starts.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Get the underlying store.
    pub fn store(&self) -> &Arc<dyn BroadcastStore> {
        &self.store
    }

    /// Sync one key, choosing cold or warm start by cache presence.
    ///
    /// The cache entry is only written after a complete merge; on error it
    /// is left untouched.
    pub async fn sync(&self, key: &ChannelProgramme) -> Result<SyncOutcome> {
        let lock = self.locks.lock_for(key);
        let _guard = lock.lock().await;

        let outcome = if self.store.exists(key) {
            self.warm_start(key).await?
        } else {
            self.cold_start(key).await?
        };

        info!(
            "Synced {} ({} start): {} fetched over {} page(s), {} cached",
            key, outcome.mode, outcome.fetched, outcome.pages, outcome.total
        );
        Ok(outcome)
    }

    /// Fetch the full history and write it as a new entry.
    async fn cold_start(&self, key: &ChannelProgramme) -> Result<SyncOutcome> {
        let (history, pages) = self.fetch_history(key).await?;
        let fetched = history.len();

        let unique = merge_broadcasts(history, Vec::new());
        self.store.write(key, &unique)?;

        Ok(SyncOutcome {
            mode: SyncMode::Cold,
            pages,
            fetched,
            total: unique.len(),
        })
    }

    /// Walk pages until the remote runs out.
    ///
    /// Stops without error on a page whose record list is missing or
    /// malformed, and on a fetch failure after the first page (keeping what
    /// was gathered). A failure of the first page is returned.
    async fn fetch_history(&self, key: &ChannelProgramme) -> Result<(Vec<BroadcastRecord>, u32)> {
        let mut history = Vec::new();
        let mut pages = 0;

        for page in 1..=self.max_pages {
            let body = match self.client.fetch_page(key, page).await {
                Ok(body) => body,
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    warn!(
                        "Stopping pagination of {} at page {}: {}; keeping {} record(s)",
                        key,
                        page,
                        e,
                        history.len()
                    );
                    return Ok((history, pages));
                }
            };

            let listing = BroadcastPage::from_response(&body);
            let Some(records) = listing.records else {
                debug!("Page {} of {} has no record list; end of data", page, key);
                return Ok((history, pages));
            };

            pages += 1;
            history.extend(records);

            if !listing.has_more_pages {
                return Ok((history, pages));
            }
        }

        warn!(
            "Stopping pagination of {} after {} page(s): page limit reached",
            key, self.max_pages
        );
        Ok((history, pages))
    }

    /// Merge the newest page into the existing entry.
    async fn warm_start(&self, key: &ChannelProgramme) -> Result<SyncOutcome> {
        let cached = self.store.read(key);
        let body = self.client.fetch_page(key, 1).await?;
        let latest = BroadcastPage::from_response(&body).into_records();
        let fetched = latest.len();

        let merged = merge_broadcasts(latest, cached);
        self.store.write(key, &merged)?;

        Ok(SyncOutcome {
            mode: SyncMode::Warm,
            pages: 1,
            fetched,
            total: merged.len(),
        })
    }
}
