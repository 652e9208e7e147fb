//! In-memory preferences store for task synchronisation tests.

use crate::task::domain::SyncSettings;
use crate::task::ports::{SettingsStore, SnapshotStoreError, SnapshotStoreResult};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory preferences store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySettingsStore {
    settings: Arc<RwLock<Option<SyncSettings>>>,
}

impl InMemorySettingsStore {
    /// Creates a store with no persisted preferences.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with an existing preferences record.
    #[must_use]
    pub fn with_settings(settings: SyncSettings) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Some(settings))),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn save(&self, settings: &SyncSettings) -> SnapshotStoreResult<()> {
        let mut stored = self
            .settings
            .write()
            .map_err(|err| SnapshotStoreError::io(std::io::Error::other(err.to_string())))?;
        *stored = Some(*settings);
        Ok(())
    }

    async fn load(&self) -> Option<SyncSettings> {
        self.settings.read().ok().and_then(|guard| *guard)
    }
}
