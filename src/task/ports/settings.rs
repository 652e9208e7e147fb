//! Preferences persistence port.

use super::{SnapshotStoreError, SnapshotStoreResult};
use crate::task::domain::SyncSettings;
use async_trait::async_trait;

/// Preferences persistence contract.
///
/// Shares the snapshot stores' failure model: saves may fail and are logged
/// by the caller, loads degrade to `None` on missing or undecodable data.
/// Failure values reuse [`SnapshotStoreError`].
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Persists the preferences record.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotStoreError`] on serialisation or I/O failure.
    async fn save(&self, settings: &SyncSettings) -> SnapshotStoreResult<()>;

    /// Loads the persisted preferences.
    ///
    /// Returns `None` when nothing was persisted or the data fails to
    /// decode.
    async fn load(&self) -> Option<SyncSettings>;
}
