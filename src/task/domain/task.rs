//! Task value record and completion lifecycle.

use super::{CalendarEventRef, TaskDomainError, TaskDuration, TaskId, TaskTitle};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task value record.
///
/// Tasks are immutable values from the caller's perspective: edits produce
/// an updated copy that the sync orchestrator swaps into its canonical
/// collection. Identity is carried by [`TaskId`]; merge deduplication keys
/// on the identifier alone, never on structural equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    is_completed: bool,
    due_date: Option<DateTime<Utc>>,
    duration: TaskDuration,
    calendar_event_ref: Option<CalendarEventRef>,
    completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new incomplete task with a fresh identifier.
    #[must_use]
    pub fn new(title: TaskTitle, due_date: Option<DateTime<Utc>>, duration: TaskDuration) -> Self {
        Self {
            id: TaskId::new(),
            title,
            is_completed: false,
            due_date,
            duration,
            calendar_event_ref: None,
            completed_at: None,
        }
    }

    /// Creates a new unscheduled task with the default duration.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is empty after
    /// trimming.
    pub fn with_title(title: impl Into<String>) -> Result<Self, TaskDomainError> {
        Ok(Self::new(TaskTitle::new(title)?, None, TaskDuration::default()))
    }

    /// Attaches a calendar event reference, consuming the task.
    ///
    /// Used when converting an imported calendar entry into a task; tasks
    /// created locally start unmirrored and acquire their reference through
    /// the mirror fan-out instead.
    #[must_use]
    pub fn with_calendar_event_ref(mut self, event_ref: CalendarEventRef) -> Self {
        self.calendar_event_ref = Some(event_ref);
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the display title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns whether the task is marked completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Returns the due date; `None` means the task is unscheduled.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the task duration.
    #[must_use]
    pub const fn duration(&self) -> TaskDuration {
        self.duration
    }

    /// Returns the external calendar reference, if the task is mirrored.
    #[must_use]
    pub const fn calendar_event_ref(&self) -> Option<&CalendarEventRef> {
        self.calendar_event_ref.as_ref()
    }

    /// Returns the completion timestamp, if the task is completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the derived end time, `due_date + duration`.
    ///
    /// Undefined (`None`) for unscheduled tasks.
    #[must_use]
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.due_date.map(|due| due + self.duration.to_chrono())
    }

    /// Replaces the display title.
    pub fn rename(&mut self, title: TaskTitle) {
        self.title = title;
    }

    /// Sets or moves the due date.
    pub const fn schedule(&mut self, due_date: DateTime<Utc>) {
        self.due_date = Some(due_date);
    }

    /// Clears the due date, returning the task to the unscheduled state.
    pub const fn unschedule(&mut self) {
        self.due_date = None;
    }

    /// Replaces the task duration.
    pub const fn resize(&mut self, duration: TaskDuration) {
        self.duration = duration;
    }

    /// Stores the external calendar reference after a successful mirror.
    pub fn set_calendar_event_ref(&mut self, event_ref: CalendarEventRef) {
        self.calendar_event_ref = Some(event_ref);
    }

    /// Drops the external calendar reference.
    pub fn clear_calendar_event_ref(&mut self) {
        self.calendar_event_ref = None;
    }

    /// Marks the task completed, stamping the completion timestamp.
    ///
    /// Stamps only on the incomplete-to-complete transition; marking an
    /// already completed task again keeps the original timestamp.
    pub fn mark_completed(&mut self, clock: &impl Clock) {
        if self.is_completed {
            return;
        }
        self.is_completed = true;
        self.completed_at = Some(clock.utc());
    }

    /// Reverts the task to incomplete, clearing the completion timestamp.
    pub const fn reopen(&mut self) {
        self.is_completed = false;
        self.completed_at = None;
    }

    /// Creates an unmirrored, incomplete copy under a fresh identifier.
    ///
    /// The copy keeps the schedule and duration; the title gains a
    /// `" (Copy)"` suffix.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the suffixed title fails
    /// validation (it cannot in practice, since the source title is
    /// non-empty).
    pub fn duplicate(&self) -> Result<Self, TaskDomainError> {
        let title = TaskTitle::new(format!("{} (Copy)", self.title))?;
        Ok(Self::new(title, self.due_date, self.duration))
    }

    /// Reconciles completion state against the previously stored record.
    ///
    /// Caller-supplied records are not trusted with the completion
    /// timestamp: the incomplete-to-complete transition stamps it from the
    /// clock, the reverse transition clears it, and a record that does not
    /// change completion inherits the stored timestamp unchanged.
    pub(crate) fn align_completion(&mut self, previous: &Self, clock: &impl Clock) {
        match (previous.is_completed, self.is_completed) {
            (false, true) => {
                self.completed_at = Some(clock.utc());
            }
            (true, false) => {
                self.completed_at = None;
            }
            _ => {
                self.completed_at = previous.completed_at;
            }
        }
    }
}
