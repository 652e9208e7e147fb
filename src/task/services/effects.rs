//! Best-effort fan-out to the calendar and notification collaborators.
//!
//! Every request here is dispatched outside the mutation critical path and
//! degrades on failure: the worst outcome is an unmirrored or unreminded
//! task, never a failed mutation.

use super::events::{PermissionKind, TaskEvent};
use crate::task::domain::{CalendarEventRef, ReminderId, ReminderKind, Task, TaskId};
use crate::task::ports::{
    CalendarGateway, CalendarGatewayError, ReminderGateway, ReminderRequest,
};
use chrono::Duration;
use mockable::Clock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Minutes before the due date the lead reminder fires.
const REMINDER_LEAD_MINUTES: i64 = 15;

/// Headline shared by all task reminders.
const REMINDER_TITLE: &str = "Task Reminder";

/// Collaborator fan-out shared by the orchestrator's mutation paths.
pub(super) struct SideEffects<C> {
    calendar: Arc<dyn CalendarGateway>,
    reminders: Arc<dyn ReminderGateway>,
    clock: Arc<C>,
    events: broadcast::Sender<TaskEvent>,
}

impl<C> SideEffects<C>
where
    C: Clock + Send + Sync,
{
    pub(super) fn new(
        calendar: Arc<dyn CalendarGateway>,
        reminders: Arc<dyn ReminderGateway>,
        clock: Arc<C>,
        events: broadcast::Sender<TaskEvent>,
    ) -> Self {
        Self {
            calendar,
            reminders,
            clock,
            events,
        }
    }

    fn emit(&self, event: TaskEvent) {
        if self.events.send(event).is_err() {
            debug!(?event, "event emitted with no subscribers");
        }
    }

    /// Ensures calendar access, prompting once through the event surface.
    async fn ensure_calendar_access(&self) -> bool {
        if self.calendar.is_authorized() {
            return true;
        }
        if self.calendar.request_access().await {
            return true;
        }
        self.emit(TaskEvent::PermissionRequired(PermissionKind::Calendar));
        false
    }

    /// Ensures notification access, prompting once through the event
    /// surface.
    async fn ensure_reminder_access(&self) -> bool {
        if self.reminders.is_authorized() {
            return true;
        }
        if self.reminders.request_access().await {
            return true;
        }
        self.emit(TaskEvent::PermissionRequired(PermissionKind::Notifications));
        false
    }

    /// Creates or updates the calendar mirror of a scheduled task.
    ///
    /// Returns the newly assigned reference when an entry was created; an
    /// update keeps the existing reference. Unscheduled tasks are never
    /// mirrored.
    pub(super) async fn mirror_schedule(&self, task: &Task) -> Option<CalendarEventRef> {
        let due = task.due_date()?;
        let end = task.end_date()?;
        if !self.ensure_calendar_access().await {
            return None;
        }
        match task.calendar_event_ref() {
            Some(event_ref) => {
                if let Err(err) = self
                    .calendar
                    .update_event(event_ref, task.title().as_str(), due, end)
                    .await
                {
                    warn!(task = %task.id(), error = %err, "calendar update failed");
                }
                None
            }
            None => match self
                .calendar
                .create_event(task.title().as_str(), due, end)
                .await
            {
                Ok(event_ref) => Some(event_ref),
                Err(CalendarGatewayError::AccessDenied) => {
                    self.emit(TaskEvent::PermissionRequired(PermissionKind::Calendar));
                    None
                }
                Err(err) => {
                    warn!(task = %task.id(), error = %err, "calendar create failed");
                    None
                }
            },
        }
    }

    /// Requests deletion of a calendar mirror entry.
    pub(super) async fn remove_mirror(&self, event_ref: &CalendarEventRef) {
        if !self.calendar.is_authorized() {
            debug!(%event_ref, "calendar unauthorized, skipping mirror removal");
            return;
        }
        if let Err(err) = self.calendar.delete_event(event_ref).await {
            warn!(%event_ref, error = %err, "calendar delete failed");
        }
    }

    /// Schedules the lead and due reminders for a scheduled task.
    ///
    /// Each reminder is requested only when its fire time is still in the
    /// future at dispatch.
    pub(super) async fn schedule_reminders(&self, task: &Task) {
        let Some(due) = task.due_date() else {
            return;
        };
        if !self.ensure_reminder_access().await {
            return;
        }
        let now = self.clock.utc();
        let lead_at = due - Duration::minutes(REMINDER_LEAD_MINUTES);
        for (kind, fire_at) in [(ReminderKind::Lead, lead_at), (ReminderKind::Due, due)] {
            if fire_at <= now {
                continue;
            }
            let request = ReminderRequest {
                id: ReminderId::new(task.id(), kind),
                fire_at,
                title: REMINDER_TITLE.to_owned(),
                body: task.title().to_string(),
            };
            if let Err(err) = self.reminders.schedule_at(request).await {
                warn!(task = %task.id(), error = %err, "reminder scheduling failed");
            }
        }
    }

    /// Cancels both reminders belonging to a task. Idempotent.
    pub(super) async fn cancel_reminders(&self, task: TaskId) {
        for kind in [ReminderKind::Lead, ReminderKind::Due] {
            let id = ReminderId::new(task, kind);
            if let Err(err) = self.reminders.cancel(id).await {
                warn!(reminder = %id, error = %err, "reminder cancellation failed");
            }
        }
    }

    /// Cancels and freshly schedules reminders for every task.
    ///
    /// Used by the startup and external-change paths, which replace the
    /// whole collection at once.
    pub(super) async fn reschedule_all(&self, tasks: &[Task], notifications_enabled: bool) {
        for task in tasks {
            self.cancel_reminders(task.id()).await;
        }
        if !notifications_enabled {
            return;
        }
        for task in tasks {
            if !task.is_completed() {
                self.schedule_reminders(task).await;
            }
        }
    }
}
