//! Shared fixtures and test doubles for task lifecycle tests.

use crate::task::adapters::memory::{
    InMemoryCalendarGateway, InMemoryCloudStore, InMemoryReminderGateway, InMemorySettingsStore,
    InMemorySnapshotStore,
};
use crate::task::domain::{SyncSettings, Task, TaskDuration, TaskTitle};
use crate::task::ports::{
    CalendarGateway, CloudStore, ReminderGateway, SettingsStore, SnapshotStore,
};
use crate::task::services::SyncOrchestrator;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Arc, RwLock};

/// Clock pinned to an explicit instant and advanced manually by tests.
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at the given instant.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, delta: Duration) {
        if let Ok(mut now) = self.now.write() {
            *now += delta;
        }
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now.read().map(|now| *now).expect("clock lock healthy")
    }
}

/// Instant every harness clock starts at.
pub fn start_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
        .single()
        .expect("valid start instant")
}

/// Creates a scheduled task due at the given offset from now.
pub fn scheduled_task(title: &str, clock: &ManualClock, due_in: Duration) -> Task {
    Task::new(
        TaskTitle::new(title).expect("valid title"),
        Some(clock.utc() + due_in),
        TaskDuration::default(),
    )
}

/// Creates an unscheduled task.
pub fn unscheduled_task(title: &str) -> Task {
    Task::with_title(title).expect("valid title")
}

/// Orchestrator wired onto in-memory adapters with a manual clock.
pub struct Harness {
    pub orchestrator: SyncOrchestrator<ManualClock>,
    pub local: Arc<InMemorySnapshotStore>,
    pub cloud: Arc<InMemoryCloudStore<ManualClock>>,
    pub calendar: Arc<InMemoryCalendarGateway>,
    pub reminders: Arc<InMemoryReminderGateway>,
    pub preferences: Arc<InMemorySettingsStore>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    /// Creates a harness with default preferences (cloud sync off).
    pub fn new() -> Self {
        Self::with_settings(SyncSettings::default())
    }

    /// Creates a harness with cloud sync already enabled.
    pub fn cloud_enabled() -> Self {
        Self::with_settings(SyncSettings {
            cloud_sync_enabled: true,
            ..SyncSettings::default()
        })
    }

    /// Creates a harness with the given persisted preferences.
    pub fn with_settings(settings: SyncSettings) -> Self {
        let clock = Arc::new(ManualClock::at(start_instant()));
        let local = Arc::new(InMemorySnapshotStore::new());
        let cloud = Arc::new(InMemoryCloudStore::new(Arc::clone(&clock)));
        let calendar = Arc::new(InMemoryCalendarGateway::new());
        let reminders = Arc::new(InMemoryReminderGateway::new());
        let preferences = Arc::new(InMemorySettingsStore::with_settings(settings));
        let orchestrator = SyncOrchestrator::new(
            Arc::clone(&local) as Arc<dyn SnapshotStore>,
            Arc::clone(&cloud) as Arc<dyn CloudStore>,
            Arc::clone(&preferences) as Arc<dyn SettingsStore>,
            Arc::clone(&calendar) as Arc<dyn CalendarGateway>,
            Arc::clone(&reminders) as Arc<dyn ReminderGateway>,
            Arc::clone(&clock),
        );
        Self {
            orchestrator,
            local,
            cloud,
            calendar,
            reminders,
            preferences,
            clock,
        }
    }

    /// Loads persisted state the way application startup does.
    pub async fn loaded(self) -> Self {
        self.orchestrator.load().await;
        self
    }
}

/// Polls a synchronous condition until it holds, panicking after a second.
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    for _ in 0_u8..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("condition not reached within one second: {what}");
}

/// Polls the canonical collection until the predicate holds.
pub async fn wait_for_collection(
    harness: &Harness,
    what: &str,
    predicate: impl Fn(&[Task]) -> bool,
) {
    for _ in 0_u8..100 {
        if predicate(&harness.orchestrator.tasks().await) {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("collection condition not reached within one second: {what}");
}

/// Gives fire-and-forget effect tasks time to finish before asserting that
/// something did not happen.
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
}
