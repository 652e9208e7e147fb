//! Recording in-memory calendar gateway for fan-out tests.

use crate::task::domain::CalendarEventRef;
use crate::task::ports::{CalendarGateway, CalendarGatewayError, CalendarGatewayResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// One request observed by the recording calendar gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarCommand {
    /// An entry was created.
    Created {
        /// Reference assigned to the new entry.
        event_ref: CalendarEventRef,
        /// Entry title.
        title: String,
        /// Entry start time.
        start: DateTime<Utc>,
        /// Entry end time.
        end: DateTime<Utc>,
    },
    /// An existing entry was rewritten.
    Updated {
        /// Reference of the rewritten entry.
        event_ref: CalendarEventRef,
        /// New entry title.
        title: String,
        /// New start time.
        start: DateTime<Utc>,
        /// New end time.
        end: DateTime<Utc>,
    },
    /// Deletion was requested for an entry.
    Deleted {
        /// Reference of the deleted entry.
        event_ref: CalendarEventRef,
    },
}

#[derive(Debug, Default)]
struct CalendarState {
    authorized: bool,
    grant_on_request: bool,
    entries: HashMap<CalendarEventRef, ()>,
    commands: Vec<CalendarCommand>,
    next_ref: u64,
}

/// Thread-safe recording calendar gateway.
///
/// Stands in for the platform calendar in tests and degraded environments:
/// every request is recorded so fan-out behaviour can be asserted exactly.
#[derive(Debug, Clone)]
pub struct InMemoryCalendarGateway {
    state: Arc<RwLock<CalendarState>>,
}

impl InMemoryCalendarGateway {
    /// Creates a gateway with access already granted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(CalendarState {
                authorized: true,
                grant_on_request: true,
                entries: HashMap::new(),
                commands: Vec::new(),
                next_ref: 0,
            })),
        }
    }

    /// Creates a gateway that denies access until
    /// [`InMemoryCalendarGateway::set_grant_on_request`] allows it.
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
    pub fn commands(&self) -> Vec<CalendarCommand> {
        self.state
            .read()
            .map(|state| state.commands.clone())
            .unwrap_or_default()
    }

    /// Returns whether an entry with the given reference currently exists.
    #[must_use]
    pub fn contains_entry(&self, event_ref: &CalendarEventRef) -> bool {
        self.state
            .read()
            .map(|state| state.entries.contains_key(event_ref))
            .unwrap_or(false)
    }
}

impl Default for InMemoryCalendarGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(err: impl std::fmt::Display) -> CalendarGatewayError {
    CalendarGatewayError::backend(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl CalendarGateway for InMemoryCalendarGateway {
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

    async fn create_event(
        &self,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CalendarGatewayResult<CalendarEventRef> {
        let mut state = self.state.write().map_err(poisoned)?;
        if !state.authorized {
            return Err(CalendarGatewayError::AccessDenied);
        }
        state.next_ref += 1;
        let event_ref = CalendarEventRef::new(format!("event-{}", state.next_ref))
            .map_err(CalendarGatewayError::backend)?;
        state.entries.insert(event_ref.clone(), ());
        state.commands.push(CalendarCommand::Created {
            event_ref: event_ref.clone(),
            title: title.to_owned(),
            start,
            end,
        });
        Ok(event_ref)
    }

    async fn update_event(
        &self,
        event_ref: &CalendarEventRef,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CalendarGatewayResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if !state.authorized {
            return Err(CalendarGatewayError::AccessDenied);
        }
        if !state.entries.contains_key(event_ref) {
            return Err(CalendarGatewayError::NotFound(event_ref.clone()));
        }
        state.commands.push(CalendarCommand::Updated {
            event_ref: event_ref.clone(),
            title: title.to_owned(),
            start,
            end,
        });
        Ok(())
    }

    async fn delete_event(&self, event_ref: &CalendarEventRef) -> CalendarGatewayResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.commands.push(CalendarCommand::Deleted {
            event_ref: event_ref.clone(),
        });
        if !state.authorized {
            return Err(CalendarGatewayError::AccessDenied);
        }
        if state.entries.remove(event_ref).is_none() {
            return Err(CalendarGatewayError::NotFound(event_ref.clone()));
        }
        Ok(())
    }
}
