//! Shared world state for task synchronisation BDD scenarios.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use dayflow::task::adapters::memory::{
    InMemoryCalendarGateway, InMemoryCloudStore, InMemoryReminderGateway, InMemorySettingsStore,
    InMemorySnapshotStore,
};
use dayflow::task::domain::TaskId;
use dayflow::task::ports::{
    CalendarGateway, CloudStore, ReminderGateway, SettingsStore, SnapshotStore,
};
use dayflow::task::services::SyncOrchestrator;
use mockable::Clock;
use rstest::fixture;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Clock pinned to an explicit instant and advanced manually by steps.
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at the scenario start instant.
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

/// Scenario world for task synchronisation behaviour tests.
pub struct SyncWorld {
    pub orchestrator: SyncOrchestrator<ManualClock>,
    pub local: Arc<InMemorySnapshotStore>,
    pub cloud: Arc<InMemoryCloudStore<ManualClock>>,
    pub preferences: Arc<InMemorySettingsStore>,
    pub clock: Arc<ManualClock>,
    pub ids_by_title: HashMap<String, TaskId>,
    pub last_swept: Option<usize>,
}

impl SyncWorld {
    /// Creates a world over fresh in-memory adapters.
    #[must_use]
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
            .single()
            .expect("valid start instant");
        let clock = Arc::new(ManualClock::at(start));
        let local = Arc::new(InMemorySnapshotStore::new());
        let cloud = Arc::new(InMemoryCloudStore::new(Arc::clone(&clock)));
        let preferences = Arc::new(InMemorySettingsStore::new());
        let orchestrator = SyncOrchestrator::new(
            Arc::clone(&local) as Arc<dyn SnapshotStore>,
            Arc::clone(&cloud) as Arc<dyn CloudStore>,
            Arc::clone(&preferences) as Arc<dyn SettingsStore>,
            Arc::new(InMemoryCalendarGateway::new()) as Arc<dyn CalendarGateway>,
            Arc::new(InMemoryReminderGateway::new()) as Arc<dyn ReminderGateway>,
            Arc::clone(&clock),
        );
        Self {
            orchestrator,
            local,
            cloud,
            preferences,
            clock,
            ids_by_title: HashMap::new(),
            last_swept: None,
        }
    }
}

impl Default for SyncWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> SyncWorld {
    SyncWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
