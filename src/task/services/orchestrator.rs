//! Sync orchestration over the canonical in-memory task collection.

use super::effects::SideEffects;
use super::events::TaskEvent;
use super::sweeper::expired_ids;
use crate::task::domain::{
    CalendarEventRef, SyncSettings, Task, TaskDomainError, TaskDuration, TaskId, TaskTitle, merge,
};
use crate::task::ports::{
    CalendarEvent, CalendarGateway, CloudChangeReason, CloudStore, ReminderGateway, SettingsStore,
    SnapshotStore,
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Buffered events before lagging subscribers drop notifications.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Title given to imported calendar entries without one.
const UNTITLED_TITLE: &str = "Untitled";

/// Result type for sync orchestrator operations.
pub type TaskSyncResult<T> = Result<T, TaskSyncError>;

/// Errors returned by sync orchestrator operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskSyncError {
    /// A task with the same identifier is already in the collection.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// No task with the identifier is in the collection.
    #[error("task not found: {0}")]
    UnknownTask(TaskId),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
}

/// Collaborator and persistence wiring behind the orchestrator.
struct Inner<C> {
    tasks: Mutex<Vec<Task>>,
    settings: RwLock<SyncSettings>,
    local: Arc<dyn SnapshotStore>,
    cloud: Arc<dyn CloudStore>,
    preferences: Arc<dyn SettingsStore>,
    effects: SideEffects<C>,
    events: broadcast::Sender<TaskEvent>,
    clock: Arc<C>,
}

/// Owner of the canonical in-memory task collection.
///
/// All mutations serialize through one async lock; the sweep tick and the
/// cloud change subscription funnel into the same lock. Collaborator fan-out
/// is dispatched fire-and-forget with no ordering guarantee relative to the
/// mutating call's return; completed results are re-applied onto the
/// serialized state.
///
/// Persistence is eventually consistent: every mutation is transactional
/// against the in-memory collection only, then written to the local store
/// and, when enabled, the cloud mirror, with failures logged and swallowed.
pub struct SyncOrchestrator<C>
where
    C: Clock + Send + Sync + 'static,
{
    inner: Arc<Inner<C>>,
}

impl<C> Clone for SyncOrchestrator<C>
where
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Fan-out decisions derived from one task update.
#[derive(Debug, Default)]
struct UpdatePlan {
    /// Mirror entry to delete because the task was unscheduled.
    removed_ref: Option<CalendarEventRef>,
    /// Create or update the calendar mirror.
    mirror: bool,
    /// Cancel both reminders.
    cancel: bool,
    /// Schedule fresh reminders after cancellation.
    schedule: bool,
}

/// Derives the collaborator fan-out for a transition from `old` to `next`.
fn plan_update(old: &Task, next: &Task) -> UpdatePlan {
    let mut plan = UpdatePlan::default();
    let was_scheduled = old.due_date().is_some();
    let scheduled = next.due_date().is_some();

    if was_scheduled && !scheduled {
        plan.removed_ref = old.calendar_event_ref().cloned();
        plan.cancel = true;
        return plan;
    }

    let schedule_changed = old.due_date() != next.due_date()
        || old.duration() != next.duration()
        || old.title() != next.title();
    plan.mirror = scheduled && (schedule_changed || !was_scheduled);

    match (old.is_completed(), next.is_completed()) {
        (false, true) => {
            plan.cancel = true;
        }
        (true, false) => {
            plan.cancel = true;
            plan.schedule = scheduled;
        }
        _ if scheduled && old.due_date() != next.due_date() && !next.is_completed() => {
            plan.cancel = true;
            plan.schedule = true;
        }
        _ => {}
    }
    plan
}

impl<C> SyncOrchestrator<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates an orchestrator with an empty collection.
    ///
    /// Call [`SyncOrchestrator::load`] to establish state from the stores.
    #[must_use]
    pub fn new(
        local: Arc<dyn SnapshotStore>,
        cloud: Arc<dyn CloudStore>,
        preferences: Arc<dyn SettingsStore>,
        calendar: Arc<dyn CalendarGateway>,
        reminders: Arc<dyn ReminderGateway>,
        clock: Arc<C>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let effects = SideEffects::new(calendar, reminders, Arc::clone(&clock), events.clone());
        Self {
            inner: Arc::new(Inner {
                tasks: Mutex::new(Vec::new()),
                settings: RwLock::new(SyncSettings::default()),
                local,
                cloud,
                preferences,
                effects,
                events,
                clock,
            }),
        }
    }

    /// Subscribes to orchestrator events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.inner.events.subscribe()
    }

    /// Returns a snapshot of the current collection.
    ///
    /// Order is unspecified; display sorting belongs to the caller.
    pub async fn tasks(&self) -> Vec<Task> {
        self.inner.tasks.lock().await.clone()
    }

    /// Returns the cached preferences.
    pub async fn settings(&self) -> SyncSettings {
        *self.inner.settings.read().await
    }

    /// Establishes the collection from the persisted snapshots.
    ///
    /// Loads preferences, then the local snapshot and (when cloud sync is
    /// enabled and the store reachable) the cloud snapshot; two snapshots
    /// merge with local priority, one is used as is, none starts empty.
    /// Finishes by dispatching a full reminder re-scheduling pass.
    pub async fn load(&self) {
        let settings = self.inner.preferences.load().await.unwrap_or_default();
        *self.inner.settings.write().await = settings;

        let local = self.inner.local.load().await;
        let cloud = if settings.cloud_sync_enabled {
            self.inner.cloud.load().await
        } else {
            None
        };

        let collection = match (local, cloud) {
            (Some(local_tasks), Some(cloud_tasks)) => merge(&local_tasks, &cloud_tasks),
            (Some(local_tasks), None) => local_tasks,
            (None, Some(cloud_tasks)) => cloud_tasks,
            (None, None) => Vec::new(),
        };
        info!(count = collection.len(), "task collection established");

        let mut tasks = self.inner.tasks.lock().await;
        *tasks = collection.clone();
        drop(tasks);

        self.inner.emit(TaskEvent::TasksChanged);
        self.spawn_reminder_pass(collection, settings.notifications_enabled);
    }

    /// Adds a task to the collection and fans out its side effects.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSyncError::DuplicateTask`] when the identifier is
    /// already present.
    pub async fn add(&self, task: Task) -> TaskSyncResult<()> {
        let mut tasks = self.inner.tasks.lock().await;
        if tasks.iter().any(|existing| existing.id() == task.id()) {
            return Err(TaskSyncError::DuplicateTask(task.id()));
        }
        tasks.push(task.clone());
        let snapshot = tasks.clone();
        self.inner.persist(&snapshot).await;
        drop(tasks);

        self.inner.emit(TaskEvent::TasksChanged);
        self.dispatch_creation_effects(task);
        Ok(())
    }

    /// Replaces a task and fans out the side effects of the transition.
    ///
    /// The completion timestamp is owned by the orchestrator: incoming
    /// records never carry it through unchecked, the incomplete-to-complete
    /// transition stamps it and the reverse clears it. The calendar
    /// reference is likewise carried over from the stored record, or
    /// dropped when the update unschedules the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSyncError::UnknownTask`] when no stored task matches
    /// the identifier.
    pub async fn update(&self, task: Task) -> TaskSyncResult<()> {
        let mut tasks = self.inner.tasks.lock().await;
        let Some(stored) = tasks.iter_mut().find(|stored| stored.id() == task.id()) else {
            return Err(TaskSyncError::UnknownTask(task.id()));
        };
        let old = stored.clone();

        let mut next = task;
        next.align_completion(&old, &*self.inner.clock);
        match old.calendar_event_ref() {
            Some(event_ref) if next.due_date().is_some() => {
                next.set_calendar_event_ref(event_ref.clone());
            }
            _ => next.clear_calendar_event_ref(),
        }

        *stored = next.clone();
        let snapshot = tasks.clone();
        self.inner.persist(&snapshot).await;
        drop(tasks);

        self.inner.emit(TaskEvent::TasksChanged);
        self.dispatch_update_effects(plan_update(&old, &next), next);
        Ok(())
    }

    /// Removes a task, requesting mirror deletion and reminder
    /// cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSyncError::UnknownTask`] when no stored task matches
    /// the identifier.
    pub async fn delete(&self, id: TaskId) -> TaskSyncResult<()> {
        let mut tasks = self.inner.tasks.lock().await;
        let Some(position) = tasks.iter().position(|task| task.id() == id) else {
            return Err(TaskSyncError::UnknownTask(id));
        };
        let removed = tasks.remove(position);
        let snapshot = tasks.clone();
        self.inner.persist(&snapshot).await;
        drop(tasks);

        self.inner.emit(TaskEvent::TasksChanged);
        self.dispatch_removal_effects(vec![removed]);
        Ok(())
    }

    /// Removes every matching task in one pass; unknown identifiers are
    /// skipped. Returns the number of removed tasks.
    pub async fn delete_many(&self, ids: &[TaskId]) -> usize {
        let mut tasks = self.inner.tasks.lock().await;
        let mut removed = Vec::new();
        tasks.retain(|task| {
            if ids.contains(&task.id()) {
                removed.push(task.clone());
                false
            } else {
                true
            }
        });
        if removed.is_empty() {
            return 0;
        }
        let snapshot = tasks.clone();
        self.inner.persist(&snapshot).await;
        drop(tasks);

        self.inner.emit(TaskEvent::TasksChanged);
        let count = removed.len();
        self.dispatch_removal_effects(removed);
        count
    }

    /// Copies a task under a fresh identifier and the `" (Copy)"` title
    /// suffix, then follows the add path.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSyncError::UnknownTask`] when no stored task matches
    /// the identifier, or a domain error when the copied title fails
    /// validation.
    pub async fn duplicate(&self, id: TaskId) -> TaskSyncResult<Task> {
        let tasks = self.inner.tasks.lock().await;
        let Some(source) = tasks.iter().find(|task| task.id() == id) else {
            return Err(TaskSyncError::UnknownTask(id));
        };
        let copy = source.duplicate()?;
        drop(tasks);

        self.add(copy.clone()).await?;
        Ok(copy)
    }

    /// Converts imported calendar entries into tasks, skipping entries
    /// whose reference is already represented in the collection. Returns
    /// the number of tasks created.
    pub async fn import_calendar_events(&self, events: Vec<CalendarEvent>) -> usize {
        let mut tasks = self.inner.tasks.lock().await;
        let mut created = 0_usize;
        for event in events {
            let exists = tasks
                .iter()
                .any(|task| task.calendar_event_ref() == Some(&event.event_ref));
            if exists {
                continue;
            }
            let Ok(title) =
                TaskTitle::new(event.title).or_else(|_| TaskTitle::new(UNTITLED_TITLE))
            else {
                continue;
            };
            let duration = TaskDuration::from_seconds((event.end - event.start).num_seconds())
                .unwrap_or_default();
            let task = Task::new(title, Some(event.start), duration)
                .with_calendar_event_ref(event.event_ref);
            tasks.push(task);
            created += 1;
        }
        if created == 0 {
            return 0;
        }
        let snapshot = tasks.clone();
        self.inner.persist(&snapshot).await;
        drop(tasks);

        self.inner.emit(TaskEvent::TasksChanged);
        created
    }

    /// Re-merges the collection after an externally originated cloud
    /// change.
    ///
    /// The merged result is persisted locally only, never pushed back to
    /// the cloud (that would echo the change to its originator), and a full
    /// reminder re-scheduling pass is dispatched.
    pub async fn on_external_change(&self) {
        self.inner.on_external_change().await;
    }

    /// Flips the persisted cloud sync flag.
    ///
    /// Enabling pushes the full current collection to the cloud store as an
    /// overwrite, without merging.
    pub async fn set_cloud_sync(&self, enabled: bool) {
        let snapshot = {
            let mut settings = self.inner.settings.write().await;
            settings.cloud_sync_enabled = enabled;
            *settings
        };
        if let Err(err) = self.inner.preferences.save(&snapshot).await {
            warn!(error = %err, "preferences save failed");
        }
        if enabled {
            let tasks = self.inner.tasks.lock().await.clone();
            if let Err(err) = self.inner.cloud.save(&tasks).await {
                warn!(error = %err, "initial cloud push failed");
            }
        }
        self.inner.emit(TaskEvent::CloudSyncChanged(enabled));
    }

    /// Flips the persisted notifications flag, gating future reminder
    /// scheduling.
    pub async fn set_notifications(&self, enabled: bool) {
        let snapshot = {
            let mut settings = self.inner.settings.write().await;
            settings.notifications_enabled = enabled;
            *settings
        };
        if let Err(err) = self.inner.preferences.save(&snapshot).await {
            warn!(error = %err, "preferences save failed");
        }
    }

    /// Runs one expiry sweep, removing every task completed at least the
    /// retention period ago. Returns the number of removed tasks.
    pub async fn sweep_once(&self) -> usize {
        self.inner.sweep_once().await
    }

    /// Spawns the periodic expiry sweep at the given cadence.
    ///
    /// Removal is idempotent, so an extra tick after a manual
    /// [`SyncOrchestrator::sweep_once`] is harmless.
    #[must_use]
    pub fn spawn_sweeper(&self, interval: std::time::Duration) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                inner.sweep_once().await;
            }
        })
    }

    /// Spawns the subscriber that funnels cloud change notifications into
    /// re-merges.
    #[must_use]
    pub fn spawn_cloud_watcher(&self) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let mut changes = inner.cloud.subscribe_changes();
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => match change.reason {
                        CloudChangeReason::ServerChange | CloudChangeReason::InitialSync => {
                            inner.on_external_change().await;
                        }
                        CloudChangeReason::QuotaViolation => {
                            warn!("cloud store reported a quota violation");
                        }
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "cloud change subscriber lagged, re-merging");
                        inner.on_external_change().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Dispatches mirror creation and reminder scheduling for a new task.
    fn dispatch_creation_effects(&self, task: Task) {
        if task.due_date().is_none() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if let Some(event_ref) = inner.effects.mirror_schedule(&task).await {
                inner.apply_calendar_ref(task.id(), event_ref).await;
            }
            if !task.is_completed() && inner.notifications_enabled().await {
                inner.effects.schedule_reminders(&task).await;
            }
        });
    }

    /// Dispatches the fan-out derived from an update transition.
    fn dispatch_update_effects(&self, plan: UpdatePlan, task: Task) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if let Some(event_ref) = plan.removed_ref {
                inner.effects.remove_mirror(&event_ref).await;
            }
            if plan.cancel || plan.schedule {
                inner.effects.cancel_reminders(task.id()).await;
            }
            if plan.schedule && !task.is_completed() && inner.notifications_enabled().await {
                inner.effects.schedule_reminders(&task).await;
            }
            if plan.mirror
                && let Some(event_ref) = inner.effects.mirror_schedule(&task).await
            {
                inner.apply_calendar_ref(task.id(), event_ref).await;
            }
        });
    }

    /// Dispatches mirror deletion and reminder cancellation for removed
    /// tasks.
    fn dispatch_removal_effects(&self, removed: Vec<Task>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            for task in removed {
                if let Some(event_ref) = task.calendar_event_ref() {
                    inner.effects.remove_mirror(event_ref).await;
                }
                inner.effects.cancel_reminders(task.id()).await;
            }
        });
    }

    /// Dispatches a cancel-all-then-reschedule pass over a collection
    /// snapshot.
    fn spawn_reminder_pass(&self, tasks: Vec<Task>, notifications_enabled: bool) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner
                .effects
                .reschedule_all(&tasks, notifications_enabled)
                .await;
        });
    }
}

impl<C> Inner<C>
where
    C: Clock + Send + Sync + 'static,
{
    fn emit(&self, event: TaskEvent) {
        if self.events.send(event).is_err() {
            debug!(?event, "event emitted with no subscribers");
        }
    }

    async fn notifications_enabled(&self) -> bool {
        self.settings.read().await.notifications_enabled
    }

    /// Writes a collection snapshot to the local store and, when enabled,
    /// the cloud mirror. Failures log and degrade.
    async fn persist(&self, tasks: &[Task]) {
        if let Err(err) = self.local.save(tasks).await {
            warn!(error = %err, "local snapshot save failed");
        }
        if self.settings.read().await.cloud_sync_enabled
            && let Err(err) = self.cloud.save(tasks).await
        {
            warn!(error = %err, "cloud snapshot save failed");
        }
    }

    /// Stores a freshly assigned calendar reference on its task, unless the
    /// task was removed or unscheduled while the request was in flight.
    async fn apply_calendar_ref(&self, id: TaskId, event_ref: CalendarEventRef) {
        let mut tasks = self.tasks.lock().await;
        let Some(task) = tasks.iter_mut().find(|task| task.id() == id) else {
            debug!(task = %id, "task removed before its calendar reference arrived");
            return;
        };
        if task.due_date().is_none() {
            debug!(task = %id, "task unscheduled before its calendar reference arrived");
            return;
        }
        task.set_calendar_event_ref(event_ref);
        let snapshot = tasks.clone();
        self.persist(&snapshot).await;
        drop(tasks);
        self.emit(TaskEvent::TasksChanged);
    }

    async fn on_external_change(&self) {
        let settings = *self.settings.read().await;
        if !settings.cloud_sync_enabled {
            debug!("ignoring cloud change while cloud sync is disabled");
            return;
        }
        let Some(remote) = self.cloud.load().await else {
            return;
        };

        let mut tasks = self.tasks.lock().await;
        let merged = merge(&tasks, &remote);
        *tasks = merged.clone();
        if let Err(err) = self.local.save(&merged).await {
            warn!(error = %err, "local snapshot save failed");
        }
        drop(tasks);

        self.emit(TaskEvent::TasksChanged);
        self.effects
            .reschedule_all(&merged, settings.notifications_enabled)
            .await;
    }

    async fn sweep_once(&self) -> usize {
        let mut tasks = self.tasks.lock().await;
        let now = self.clock.utc();
        let expired = expired_ids(&tasks, now);
        if expired.is_empty() {
            return 0;
        }
        tasks.retain(|task| !expired.contains(&task.id()));
        let snapshot = tasks.clone();
        self.persist(&snapshot).await;
        drop(tasks);

        debug!(count = expired.len(), "expired completed tasks removed");
        self.emit(TaskEvent::TasksChanged);
        expired.len()
    }
}
