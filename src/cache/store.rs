//! Durable storage of broadcast collections.
//!
//! Collections are stored one file per `(channel, programme)` key:
//! ```text
//! {root}/
//! └── npo-radio/
//!     ├── npo-3fm/
//!     │   └── 3voor12-radio.json
//!     └── npo-radio-2/
//!         └── spijkers-met-koppen.json
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::broadcast::{BroadcastRecord, ChannelProgramme};
use crate::cache::shape::normalize_bytes;
use crate::Result;

/// File extension of cache entries.
const ENTRY_EXTENSION: &str = "json";

/// Key-value storage for broadcast collections.
pub trait BroadcastStore: Send + Sync {
    /// Whether an entry exists for the key.
    fn exists(&self, key: &ChannelProgramme) -> bool;

    /// Read the collection stored under the key.
    ///
    /// Missing, unreadable or unrecognised entries read as empty.
    fn read(&self, key: &ChannelProgramme) -> Vec<BroadcastRecord>;

    /// Replace the collection stored under the key.
    fn write(&self, key: &ChannelProgramme, records: &[BroadcastRecord]) -> Result<()>;

    /// Enumerate every key that currently has an entry.
    fn list_keys(&self) -> Result<Vec<ChannelProgramme>>;
}

/// File-backed broadcast store.
#[derive(Debug, Clone)]
pub struct FileBroadcastStore {
    /// Directory holding one subdirectory per channel.
    namespace_dir: PathBuf,
}

impl FileBroadcastStore {
    /// Create a store rooted at `root/namespace`.
    ///
    /// The namespace directory will be created if it doesn't exist.
    pub fn new(root: impl AsRef<Path>, namespace: &str) -> Result<Self> {
        let namespace_dir = root.as_ref().join(namespace);
        fs::create_dir_all(&namespace_dir)?;

        Ok(Self { namespace_dir })
    }

    /// Get the namespace directory of this store.
    pub fn namespace_dir(&self) -> &Path {
        &self.namespace_dir
    }

    /// Get the file path for a key.
    pub fn entry_path(&self, key: &ChannelProgramme) -> PathBuf {
        self.namespace_dir
            .join(&key.channel)
            .join(format!("{}.{ENTRY_EXTENSION}", key.programme))
    }

    /// Keys stored below one channel directory.
    fn list_channel(&self, channel_dir: &Path, channel: &str) -> Result<Vec<ChannelProgramme>> {
        let mut keys = Vec::new();

        for entry in fs::read_dir(channel_dir)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION)
            {
                continue;
            }
            let Some(programme) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Temporary files and anything else that is not a valid key
            match ChannelProgramme::new(channel, programme) {
                Ok(key) => keys.push(key),
                Err(e) => debug!("Skipping cache file {}: {}", path.display(), e),
            }
        }

        Ok(keys)
    }
}

impl BroadcastStore for FileBroadcastStore {
    fn exists(&self, key: &ChannelProgramme) -> bool {
        self.entry_path(key).is_file()
    }

    fn read(&self, key: &ChannelProgramme) -> Vec<BroadcastRecord> {
        let path = self.entry_path(key);

        match fs::read(&path) {
            Ok(bytes) => normalize_bytes(&bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("Failed to read cache entry {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    fn write(&self, key: &ChannelProgramme, records: &[BroadcastRecord]) -> Result<()> {
        let path = self.entry_path(key);
        let dir = path.parent().unwrap_or(self.namespace_dir.as_path());
        fs::create_dir_all(dir)?;

        let json = serde_json::to_vec_pretty(records)?;

        // Uniquely named temp file in the same directory, renamed over the
        // entry so readers and concurrent writers never see a partial file
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(&json)?;
        temp.persist(&path).map_err(|e| e.error)?;

        debug!("Stored {} broadcast(s) for {}", records.len(), key);
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<ChannelProgramme>> {
        let entries = match fs::read_dir(&self.namespace_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(channel) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if channel.starts_with('.') {
                continue;
            }
            keys.extend(self.list_channel(&path, channel)?);
        }

        keys.sort();
        Ok(keys)
    }
}
