//! Application services for task synchronisation and lifecycle.

mod effects;
mod events;
mod orchestrator;
mod sweeper;

pub use events::{PermissionKind, TaskEvent};
pub use orchestrator::{SyncOrchestrator, TaskSyncError, TaskSyncResult};
pub use sweeper::{COMPLETED_RETENTION_MINUTES, SWEEP_INTERVAL, expired_ids};
