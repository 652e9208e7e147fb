//! Filesystem adapters for durable local persistence.

mod settings;
mod snapshot;

pub use settings::FileSettingsStore;
pub use snapshot::FileSnapshotStore;
