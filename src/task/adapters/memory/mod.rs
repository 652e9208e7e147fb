//! In-memory adapters for task synchronisation tests and degraded modes.

mod calendar;
mod cloud;
mod reminder;
mod settings;
mod snapshot;

pub use calendar::{CalendarCommand, InMemoryCalendarGateway};
pub use cloud::InMemoryCloudStore;
pub use reminder::{InMemoryReminderGateway, ReminderCommand};
pub use settings::InMemorySettingsStore;
pub use snapshot::InMemorySnapshotStore;
