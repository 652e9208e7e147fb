//! In-memory snapshot store for task synchronisation tests.

use crate::task::domain::Task;
use crate::task::ports::{SnapshotStore, SnapshotStoreError, SnapshotStoreResult};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory snapshot store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStore {
    snapshot: Arc<RwLock<Option<Vec<Task>>>>,
}

impl InMemorySnapshotStore {
    /// Creates a store with no prior snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with an existing snapshot.
    #[must_use]
    pub fn with_snapshot(tasks: Vec<Task>) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Some(tasks))),
        }
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save(&self, tasks: &[Task]) -> SnapshotStoreResult<()> {
        let mut snapshot = self
            .snapshot
            .write()
            .map_err(|err| SnapshotStoreError::io(std::io::Error::other(err.to_string())))?;
        *snapshot = Some(tasks.to_vec());
        Ok(())
    }

    async fn load(&self) -> Option<Vec<Task>> {
        self.snapshot.read().ok().and_then(|guard| guard.clone())
    }
}
