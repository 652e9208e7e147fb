//! Time-boxed expiry of completed tasks.

use crate::task::domain::{Task, TaskId};
use chrono::{DateTime, Duration, Utc};

/// Cadence of the periodic expiry sweep.
pub const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// Minutes a completed task remains visible before the sweep removes it.
pub const COMPLETED_RETENTION_MINUTES: i64 = 30;

/// Returns the identifiers of tasks whose completion grace period elapsed.
///
/// A task expires once it is completed, carries a completion timestamp, and
/// at least [`COMPLETED_RETENTION_MINUTES`] have passed since that
/// timestamp. Tasks without a due date follow the same rule; the sweep
/// never touches incomplete tasks.
#[must_use]
pub fn expired_ids(tasks: &[Task], now: DateTime<Utc>) -> Vec<TaskId> {
    let retention = Duration::minutes(COMPLETED_RETENTION_MINUTES);
    tasks
        .iter()
        .filter(|task| task.is_completed())
        .filter_map(|task| task.completed_at().map(|at| (task.id(), at)))
        .filter(|(_, completed_at)| now - *completed_at >= retention)
        .map(|(id, _)| id)
        .collect()
}
