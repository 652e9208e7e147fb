//! In-memory cloud mirror for task synchronisation tests.

use crate::task::domain::Task;
use crate::task::ports::{
    CloudChange, CloudChangeReason, CloudStore, SnapshotStore, SnapshotStoreError,
    SnapshotStoreResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

/// Capacity ceiling matching the practical limit of device key-value
/// stores.
const DEFAULT_CAPACITY_BYTES: usize = 1_048_576;

/// Buffered change notifications before lagging subscribers drop events.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Default)]
struct CloudState {
    snapshot: Option<Vec<Task>>,
    available: bool,
    last_sync: Option<DateTime<Utc>>,
}

/// Thread-safe in-memory cloud key-value mirror.
///
/// Models the behaviours the orchestrator depends on: an availability flag,
/// a capacity ceiling, a last-sync timestamp, and externally originated
/// change notifications injected by tests through
/// [`InMemoryCloudStore::push_external_snapshot`].
#[derive(Debug)]
pub struct InMemoryCloudStore<C> {
    state: Arc<RwLock<CloudState>>,
    changes: broadcast::Sender<CloudChange>,
    clock: Arc<C>,
    capacity: usize,
}

impl<C> Clone for InMemoryCloudStore<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            changes: self.changes.clone(),
            clock: Arc::clone(&self.clock),
            capacity: self.capacity,
        }
    }
}

impl<C> InMemoryCloudStore<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an available, empty cloud store.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(CloudState {
                snapshot: None,
                available: true,
                last_sync: None,
            })),
            changes,
            clock,
            capacity: DEFAULT_CAPACITY_BYTES,
        }
    }

    /// Overrides the capacity ceiling in bytes.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Flips the availability flag, e.g. to model a signed-out account.
    pub fn set_available(&self, available: bool) {
        if let Ok(mut state) = self.state.write() {
            state.available = available;
        }
    }

    /// Replaces the stored snapshot as another device would and notifies
    /// subscribers of a server-originated change.
    pub fn push_external_snapshot(&self, tasks: Vec<Task>) {
        if let Ok(mut state) = self.state.write() {
            state.snapshot = Some(tasks);
        }
        self.emit(CloudChangeReason::ServerChange);
    }

    /// Emits a change notification without touching the snapshot.
    pub fn emit(&self, reason: CloudChangeReason) {
        if self.changes.send(CloudChange { reason }).is_err() {
            debug!(?reason, "cloud change emitted with no subscribers");
        }
    }

    fn stamp_sync(&self) {
        if let Ok(mut state) = self.state.write() {
            state.last_sync = Some(self.clock.utc());
        }
    }
}

#[async_trait]
impl<C> SnapshotStore for InMemoryCloudStore<C>
where
    C: Clock + Send + Sync,
{
    async fn save(&self, tasks: &[Task]) -> SnapshotStoreResult<()> {
        if !self.is_available() {
            debug!("cloud store unavailable, skipping save");
            return Ok(());
        }
        let encoded = serde_json::to_vec(tasks).map_err(SnapshotStoreError::serialisation)?;
        if encoded.len() > self.capacity {
            return Err(SnapshotStoreError::QuotaExceeded {
                size: encoded.len(),
            });
        }
        let mut state = self
            .state
            .write()
            .map_err(|err| SnapshotStoreError::io(std::io::Error::other(err.to_string())))?;
        state.snapshot = Some(tasks.to_vec());
        drop(state);
        self.stamp_sync();
        Ok(())
    }

    async fn load(&self) -> Option<Vec<Task>> {
        if !self.is_available() {
            debug!("cloud store unavailable, skipping load");
            return None;
        }
        let snapshot = self.state.read().ok().and_then(|state| state.snapshot.clone());
        if snapshot.is_some() {
            self.stamp_sync();
        }
        snapshot
    }
}

#[async_trait]
impl<C> CloudStore for InMemoryCloudStore<C>
where
    C: Clock + Send + Sync,
{
    fn is_available(&self) -> bool {
        self.state.read().map(|state| state.available).unwrap_or(false)
    }

    fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.state.read().ok().and_then(|state| state.last_sync)
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<CloudChange> {
        self.changes.subscribe()
    }
}
