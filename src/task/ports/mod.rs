//! Port contracts for task synchronisation and lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

mod calendar;
mod reminder;
mod settings;
mod snapshot;

pub use calendar::{CalendarEvent, CalendarGateway, CalendarGatewayError, CalendarGatewayResult};
pub use reminder::{ReminderGateway, ReminderGatewayError, ReminderGatewayResult, ReminderRequest};
pub use settings::SettingsStore;
pub use snapshot::{
    CloudChange, CloudChangeReason, CloudStore, SnapshotStore, SnapshotStoreError,
    SnapshotStoreResult,
};
