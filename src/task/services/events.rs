//! Event surface the UI layer subscribes to.

/// Collaborator whose access the user must be prompted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionKind {
    /// Device calendar access.
    Calendar,
    /// Notification delivery access.
    Notifications,
}

/// Events published by the sync orchestrator.
///
/// The orchestrator never reaches into a UI framework; interested layers
/// subscribe through [`super::SyncOrchestrator::subscribe`] and pull the
/// current collection when notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    /// The canonical task collection changed.
    TasksChanged,
    /// Cloud synchronisation was switched on or off.
    CloudSyncChanged(bool),
    /// A collaborator denied access and a one-time prompt is warranted.
    PermissionRequired(PermissionKind),
}
