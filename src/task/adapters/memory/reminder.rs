//! Recording in-memory reminder gateway for fan-out tests.

use crate::task::domain::{ReminderId, TaskId};
use crate::task::ports::{
    ReminderGateway, ReminderGatewayError, ReminderGatewayResult, ReminderRequest,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// One request observed by the recording reminder gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderCommand {
    /// A reminder was scheduled.
    Scheduled(ReminderRequest),
    /// Cancellation was requested for a reminder identifier.
    Cancelled(ReminderId),
}

#[derive(Debug, Default)]
struct ReminderState {
    authorized: bool,
    grant_on_request: bool,
    pending: HashMap<ReminderId, ReminderRequest>,
    commands: Vec<ReminderCommand>,
}

/// Thread-safe recording reminder gateway.
#[derive(Debug, Clone)]
pub struct InMemoryReminderGateway {
    state: Arc<RwLock<ReminderState>>,
}

impl InMemoryReminderGateway {
    /// Creates a gateway with access already granted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(ReminderState {
                authorized: true,
                grant_on_request: true,
                pending: HashMap::new(),
                commands: Vec::new(),
            })),
        }
    }

    /// Creates a gateway that denies access until
    /// [`InMemoryReminderGateway::set_grant_on_request`] allows it.
    #[must_use]
    pub fn denied() -> Self {
        let gateway = Self::new();
        gateway.revoke();
        gateway
    }

    /// Revokes granted access and makes future requests fail.
    pub fn revoke(&self) {
        if let Ok(mut state) = self.state.write() {
            state.authorized = false;
            state.grant_on_request = false;
        }
    }

    /// Controls whether a future access request is granted.
    pub fn set_grant_on_request(&self, grant: bool) {
        if let Ok(mut state) = self.state.write() {
            state.grant_on_request = grant;
        }
    }

    /// Returns every request observed so far, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<ReminderCommand> {
        self.state
            .read()
            .map(|state| state.commands.clone())
            .unwrap_or_default()
    }

    /// Returns the pending reminders belonging to a task.
    #[must_use]
    pub fn pending_for(&self, task: TaskId) -> Vec<ReminderRequest> {
        self.state
            .read()
            .map(|state| {
                state
                    .pending
                    .values()
                    .filter(|request| request.id.task() == task)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the number of pending reminders across all tasks.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.state.read().map(|state| state.pending.len()).unwrap_or(0)
    }
}

impl Default for InMemoryReminderGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(err: impl std::fmt::Display) -> ReminderGatewayError {
    ReminderGatewayError::backend(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ReminderGateway for InMemoryReminderGateway {
    fn is_authorized(&self) -> bool {
        self.state
            .read()
            .map(|state| state.authorized)
            .unwrap_or(false)
    }

    async fn request_access(&self) -> bool {
        self.state
            .write()
            .map(|mut state| {
                state.authorized = state.grant_on_request;
                state.authorized
            })
            .unwrap_or(false)
    }

    async fn schedule_at(&self, request: ReminderRequest) -> ReminderGatewayResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if !state.authorized {
            return Err(ReminderGatewayError::AccessDenied);
        }
        state
            .commands
            .push(ReminderCommand::Scheduled(request.clone()));
        state.pending.insert(request.id, request);
        Ok(())
    }

    async fn cancel(&self, id: ReminderId) -> ReminderGatewayResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.commands.push(ReminderCommand::Cancelled(id));
        state.pending.remove(&id);
        Ok(())
    }
}
