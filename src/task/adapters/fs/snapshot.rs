//! File-backed local snapshot store.

use crate::task::domain::Task;
use crate::task::ports::{SnapshotStore, SnapshotStoreError, SnapshotStoreResult};
use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use std::io;
use std::path::Path;
use tracing::warn;

/// Fixed snapshot file name inside the store directory.
const SNAPSHOT_FILE: &str = "tasks.json";

/// Staging name used to make snapshot replacement atomic.
const SNAPSHOT_TMP_FILE: &str = "tasks.json.tmp";

/// Durable local snapshot store writing one JSON document per save.
///
/// Saves go through a staging file and a rename so an interrupted write
/// never corrupts the previous snapshot. A missing or undecodable snapshot
/// loads as `None`.
#[derive(Debug)]
pub struct FileSnapshotStore {
    dir: Dir,
}

impl FileSnapshotStore {
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
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, tasks: &[Task]) -> SnapshotStoreResult<()> {
        let encoded =
            serde_json::to_vec_pretty(tasks).map_err(SnapshotStoreError::serialisation)?;
        self.dir
            .write(SNAPSHOT_TMP_FILE, &encoded)
            .map_err(SnapshotStoreError::io)?;
        self.dir
            .rename(SNAPSHOT_TMP_FILE, &self.dir, SNAPSHOT_FILE)
            .map_err(SnapshotStoreError::io)?;
        Ok(())
    }

    async fn load(&self) -> Option<Vec<Task>> {
        let encoded = match self.dir.read(SNAPSHOT_FILE) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(error = %err, "failed to read task snapshot, treating as empty");
                return None;
            }
        };
        match serde_json::from_slice(&encoded) {
            Ok(tasks) => Some(tasks),
            Err(err) => {
                warn!(error = %err, "discarding undecodable task snapshot");
                None
            }
        }
    }
}
