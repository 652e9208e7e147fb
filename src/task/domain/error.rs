//! Error types for task domain validation.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task duration is not a positive number of seconds.
    #[error("invalid task duration {0} s, expected a positive value")]
    InvalidDuration(i64),

    /// The calendar event reference is empty after trimming.
    #[error("calendar event reference must not be empty")]
    EmptyCalendarEventRef,
}
