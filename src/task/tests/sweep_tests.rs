//! Tests for the time-boxed expiry sweep.

use super::support::{ManualClock, start_instant, unscheduled_task};
use crate::task::services::{COMPLETED_RETENTION_MINUTES, expired_ids};
use chrono::Duration;
use mockable::Clock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> ManualClock {
    ManualClock::at(start_instant())
}

#[rstest]
fn incomplete_tasks_never_expire(clock: ManualClock) {
    let task = unscheduled_task("Open item");
    clock.advance(Duration::days(7));

    assert!(expired_ids(&[task], clock.utc()).is_empty());
}

#[rstest]
fn completed_task_survives_until_the_retention_boundary(clock: ManualClock) {
    let mut task = unscheduled_task("Done item");
    task.mark_completed(&clock);

    clock.advance(Duration::minutes(COMPLETED_RETENTION_MINUTES) - Duration::seconds(1));
    assert!(expired_ids(&[task], clock.utc()).is_empty());
}

#[rstest]
fn completed_task_expires_exactly_at_the_retention_boundary(clock: ManualClock) {
    let mut task = unscheduled_task("Done item");
    task.mark_completed(&clock);

    clock.advance(Duration::minutes(COMPLETED_RETENTION_MINUTES));
    assert_eq!(expired_ids(&[task.clone()], clock.utc()), vec![task.id()]);
}

#[rstest]
fn sweep_selects_only_tasks_past_their_own_stamp(clock: ManualClock) {
    let mut early = unscheduled_task("Finished early");
    early.mark_completed(&clock);

    clock.advance(Duration::minutes(20));
    let mut late = unscheduled_task("Finished late");
    late.mark_completed(&clock);

    clock.advance(Duration::minutes(10));
    let tasks = vec![early.clone(), late];

    assert_eq!(expired_ids(&tasks, clock.utc()), vec![early.id()]);
}

#[rstest]
fn reopened_tasks_are_not_swept(clock: ManualClock) {
    let mut task = unscheduled_task("Reopened");
    task.mark_completed(&clock);
    task.reopen();

    clock.advance(Duration::hours(2));
    assert!(expired_ids(&[task], clock.utc()).is_empty());
}
