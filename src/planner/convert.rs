//! Conversion of proxy wire tasks into domain tasks.

use super::wire::PlannedTask;
use crate::task::domain::{Task, TaskDomainError, TaskDuration, TaskTitle};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Parses a `YYYY-MM-DD` wire date.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Parses an `HH:mm` wire time.
fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").ok()
}

/// Resolves a caller-local wall-clock datetime to UTC.
///
/// Falls back to the earlier instant across daylight-saving transitions and
/// to `None` for wall-clock times skipped by one.
fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|resolved| resolved.with_timezone(&Utc))
}

/// Derives the due date of a planned task.
///
/// A date with a time combines both in local time; a date without a time
/// falls on local midnight; a missing or unparseable date leaves the task
/// unscheduled.
fn due_date_from_wire(planned: &PlannedTask) -> Option<DateTime<Utc>> {
    let date = planned.date.as_deref().and_then(parse_date)?;
    let time = planned
        .time
        .as_deref()
        .and_then(parse_time)
        .unwrap_or(NaiveTime::MIN);
    local_to_utc(date.and_time(time))
}

/// Converts one planned task into a domain task.
///
/// The wire duration is whole minutes; non-positive values fall back to the
/// default span. The wire priority is dropped.
///
/// # Errors
///
/// Returns [`TaskDomainError::EmptyTitle`] when the planned title is empty
/// after trimming.
pub fn planned_to_task(planned: &PlannedTask) -> Result<Task, TaskDomainError> {
    let title = TaskTitle::new(planned.title.clone())?;
    let due_date = due_date_from_wire(planned);
    let duration = TaskDuration::from_minutes(planned.duration).unwrap_or_default();
    Ok(Task::new(title, due_date, duration))
}

/// Converts a full proxy response, skipping planned tasks whose titles fail
/// validation.
#[must_use]
pub fn planned_to_tasks(planned: &[PlannedTask]) -> Vec<Task> {
    planned
        .iter()
        .filter_map(|entry| planned_to_task(entry).ok())
        .collect()
}
