//! Domain model for task synchronisation and lifecycle management.
//!
//! The task domain models the task value record, its completion lifecycle,
//! the identifier-keyed merge of two task collections, and persisted
//! synchronisation preferences, keeping all infrastructure concerns outside
//! of the domain boundary.

mod error;
mod ids;
mod merge;
mod settings;
mod task;

pub use error::TaskDomainError;
pub use ids::{CalendarEventRef, ReminderId, ReminderKind, TaskDuration, TaskId, TaskTitle};
pub use merge::merge;
pub use settings::SyncSettings;
pub use task::Task;
