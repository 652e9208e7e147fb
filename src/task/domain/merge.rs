//! Reconciliation of two task collections.

use super::{Task, TaskId};
use std::collections::HashMap;

/// Merges a local and a remote task collection, keyed by task identifier.
///
/// Every remote task is inserted first, then every local task, overwriting
/// any remote entry that shares an identifier: on collision the local record
/// wins unconditionally, with no timestamp or field-level comparison. The
/// result's identifier set is the union of both inputs; its order is
/// unspecified and callers must not rely on it.
///
/// Total and pure: no I/O, no failure modes.
#[must_use]
pub fn merge(local: &[Task], remote: &[Task]) -> Vec<Task> {
    let mut by_id: HashMap<TaskId, Task> =
        HashMap::with_capacity(local.len() + remote.len());
    for task in remote {
        by_id.insert(task.id(), task.clone());
    }
    for task in local {
        by_id.insert(task.id(), task.clone());
    }
    by_id.into_values().collect()
}
