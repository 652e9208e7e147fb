//! File-backed preferences store.

use crate::task::domain::SyncSettings;
use crate::task::ports::{SettingsStore, SnapshotStoreError, SnapshotStoreResult};
use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use std::io;
use std::path::Path;
use tracing::warn;

/// Fixed preferences file name inside the store directory.
const SETTINGS_FILE: &str = "settings.json";

/// Staging name used to make preferences replacement atomic.
const SETTINGS_TMP_FILE: &str = "settings.json.tmp";

/// Durable preferences store writing one JSON document per save.
#[derive(Debug)]
pub struct FileSettingsStore {
    dir: Dir,
}

impl FileSettingsStore {
    /// Opens the store over an ambient directory path.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be
    /// opened.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self { dir })
    }

    /// Creates the store over an already-opened capability directory.
    #[must_use]
    pub const fn new(dir: Dir) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn save(&self, settings: &SyncSettings) -> SnapshotStoreResult<()> {
        let encoded =
            serde_json::to_vec_pretty(settings).map_err(SnapshotStoreError::serialisation)?;
        self.dir
            .write(SETTINGS_TMP_FILE, &encoded)
            .map_err(SnapshotStoreError::io)?;
        self.dir
            .rename(SETTINGS_TMP_FILE, &self.dir, SETTINGS_FILE)
            .map_err(SnapshotStoreError::io)?;
        Ok(())
    }

    async fn load(&self) -> Option<SyncSettings> {
        let encoded = match self.dir.read(SETTINGS_FILE) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(error = %err, "failed to read preferences, using defaults");
                return None;
            }
        };
        match serde_json::from_slice(&encoded) {
            Ok(settings) => Some(settings),
            Err(err) => {
                warn!(error = %err, "discarding undecodable preferences");
                None
            }
        }
    }
}
