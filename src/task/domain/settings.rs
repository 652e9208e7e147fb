//! Persisted synchronisation preferences.

use super::TaskDuration;
use serde::{Deserialize, Serialize};

/// User preferences governing synchronisation and reminders.
///
/// Persisted through the settings store and loaded at startup; the sync
/// orchestrator consults the cached copy on every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Whether the cloud mirror receives snapshots. Off by default; flipping
    /// it on pushes the full current collection as an overwrite.
    pub cloud_sync_enabled: bool,
    /// Whether reminders are scheduled for scheduled tasks.
    pub notifications_enabled: bool,
    /// Duration seeded into tasks created without an explicit span.
    pub default_duration: TaskDuration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            cloud_sync_enabled: false,
            notifications_enabled: true,
            default_duration: TaskDuration::default(),
        }
    }
}
