//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a task record.
///
/// Assigned once at creation and stable for the task's lifetime; the sole
/// key used when merging task collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for TaskId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-empty task display title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated title, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the value is empty after
    /// trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task time span in whole seconds.
///
/// Combined with a due date to derive the task's end time. Defaults to one
/// hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDuration(i64);

impl TaskDuration {
    /// Default task span of one hour.
    pub const ONE_HOUR: Self = Self(3600);

    /// Creates a validated duration from whole seconds.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidDuration`] when the value is zero
    /// or negative.
    pub const fn from_seconds(seconds: i64) -> Result<Self, TaskDomainError> {
        if seconds <= 0 {
            return Err(TaskDomainError::InvalidDuration(seconds));
        }
        Ok(Self(seconds))
    }

    /// Creates a validated duration from whole minutes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidDuration`] when the value is zero.
    pub const fn from_minutes(minutes: u32) -> Result<Self, TaskDomainError> {
        Self::from_seconds(minutes as i64 * 60)
    }

    /// Returns the span in whole seconds.
    #[must_use]
    pub const fn seconds(self) -> i64 {
        self.0
    }

    /// Returns the span as a `chrono` duration.
    #[must_use]
    pub fn to_chrono(self) -> chrono::Duration {
        chrono::Duration::seconds(self.0)
    }
}

impl Default for TaskDuration {
    fn default() -> Self {
        Self::ONE_HOUR
    }
}

/// Opaque reference correlating a task to an entry in an external calendar.
///
/// Absence on a task means the task is not mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarEventRef(String);

impl CalendarEventRef {
    /// Creates a validated calendar event reference.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyCalendarEventRef`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(TaskDomainError::EmptyCalendarEventRef);
        }
        Ok(Self(raw))
    }

    /// Returns the reference as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CalendarEventRef {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CalendarEventRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two reminders attached to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderKind {
    /// Fires fifteen minutes before the due date.
    Lead,
    /// Fires exactly at the due date.
    Due,
}

impl ReminderKind {
    /// Returns the canonical identifier segment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Due => "due",
        }
    }
}

/// Identifier of one scheduled reminder, derived from the owning task.
///
/// A task owns at most one reminder per [`ReminderKind`], so the pair is
/// stable across rescheduling and cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReminderId {
    task: TaskId,
    kind: ReminderKind,
}

impl ReminderId {
    /// Creates the reminder identifier for a task and kind.
    #[must_use]
    pub const fn new(task: TaskId, kind: ReminderKind) -> Self {
        Self { task, kind }
    }

    /// Returns the owning task identifier.
    #[must_use]
    pub const fn task(self) -> TaskId {
        self.task
    }

    /// Returns the reminder kind.
    #[must_use]
    pub const fn kind(self) -> ReminderKind {
        self.kind
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.task, self.kind.as_str())
    }
}
