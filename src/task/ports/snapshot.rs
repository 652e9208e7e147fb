//! Snapshot persistence ports for the local store and the cloud mirror.

use crate::task::domain::Task;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Result type for snapshot store operations.
pub type SnapshotStoreResult<T> = Result<T, SnapshotStoreError>;

/// Persistence contract shared by the local store and the cloud mirror.
///
/// Both backends serialise the full task collection as one snapshot under a
/// fixed key. Neither holds an authoritative copy: the sync orchestrator
/// owns the canonical in-memory collection and stores only serialise and
/// deserialise snapshots on request.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persists the full task collection, replacing any prior snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotStoreError`] on serialisation or I/O failure.
    /// Callers log and swallow the failure; a failed save never loses the
    /// in-memory collection.
    async fn save(&self, tasks: &[Task]) -> SnapshotStoreResult<()>;

    /// Loads the most recent snapshot.
    ///
    /// Returns `None` when no snapshot exists and on any decode failure,
    /// which is treated identically to missing data and logged by the
    /// adapter.
    async fn load(&self) -> Option<Vec<Task>>;
}

/// Reason attached to an externally originated cloud store change.
///
/// Mirrors the change reasons the underlying key-value store reports; only
/// server-originated and initial-sync changes trigger a re-merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudChangeReason {
    /// Another device wrote the snapshot key.
    ServerChange,
    /// First synchronisation after the store became reachable.
    InitialSync,
    /// The store rejected a write for exceeding its capacity ceiling.
    QuotaViolation,
}

/// Notification of a cloud store change not caused by this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloudChange {
    /// Why the store reported the change.
    pub reason: CloudChangeReason,
}

/// Cloud key-value mirror contract.
///
/// Extends the snapshot contract with availability (the store may be
/// unreachable, e.g. no account signed in, in which case `save` becomes a
/// no-op and `load` returns `None`), a last-successful-sync timestamp, and
/// a subscription for externally originated changes.
#[async_trait]
pub trait CloudStore: SnapshotStore {
    /// Returns whether the cloud store is currently reachable.
    fn is_available(&self) -> bool;

    /// Returns the time of the last successful save or load, if any.
    fn last_sync(&self) -> Option<DateTime<Utc>>;

    /// Subscribes to externally originated change notifications.
    ///
    /// Changes caused by this process's own writes are never emitted.
    fn subscribe_changes(&self) -> broadcast::Receiver<CloudChange>;
}

/// Errors returned by snapshot store implementations.
#[derive(Debug, Clone, Error)]
pub enum SnapshotStoreError {
    /// The task collection could not be serialised or deserialised.
    #[error("snapshot serialisation failed: {0}")]
    Serialisation(Arc<dyn std::error::Error + Send + Sync>),

    /// The backing store rejected the read or write.
    #[error("snapshot store I/O failed: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),

    /// The snapshot exceeds the store's capacity ceiling.
    #[error("snapshot of {size} bytes exceeds the store capacity")]
    QuotaExceeded {
        /// Serialised snapshot size in bytes.
        size: usize,
    },
}

impl SnapshotStoreError {
    /// Wraps a serialisation error.
    pub fn serialisation(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Serialisation(Arc::new(err))
    }

    /// Wraps an I/O error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}
