//! Calendar collaborator port.

use crate::task::domain::CalendarEventRef;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for calendar gateway operations.
pub type CalendarGatewayResult<T> = Result<T, CalendarGatewayError>;

/// Snapshot of an entry in the external calendar.
///
/// Produced by the platform layer when importing calendar entries as tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Opaque reference identifying the entry in the external calendar.
    pub event_ref: CalendarEventRef,
    /// Entry title.
    pub title: String,
    /// Entry start time.
    pub start: DateTime<Utc>,
    /// Entry end time.
    pub end: DateTime<Utc>,
}

/// External calendar contract.
///
/// Mirror requests are best effort: the orchestrator dispatches them outside
/// the mutation critical path and degrades on failure, so implementations
/// must never block indefinitely.
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Returns whether calendar access has been granted.
    fn is_authorized(&self) -> bool;

    /// Requests calendar access from the platform; returns the grant.
    async fn request_access(&self) -> bool;

    /// Creates a calendar entry spanning `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarGatewayError::AccessDenied`] without authorization
    /// or [`CalendarGatewayError::Backend`] on collaborator failure.
    async fn create_event(
        &self,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CalendarGatewayResult<CalendarEventRef>;

    /// Rewrites the title and span of an existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarGatewayError::NotFound`] when the reference no
    /// longer resolves, [`CalendarGatewayError::AccessDenied`] without
    /// authorization, or [`CalendarGatewayError::Backend`] on failure.
    async fn update_event(
        &self,
        event_ref: &CalendarEventRef,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CalendarGatewayResult<()>;

    /// Deletes an existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarGatewayError::NotFound`] when the reference no
    /// longer resolves, [`CalendarGatewayError::AccessDenied`] without
    /// authorization, or [`CalendarGatewayError::Backend`] on failure.
    async fn delete_event(&self, event_ref: &CalendarEventRef) -> CalendarGatewayResult<()>;
}

/// Errors returned by calendar gateway implementations.
#[derive(Debug, Clone, Error)]
pub enum CalendarGatewayError {
    /// The user has not granted calendar access.
    #[error("calendar access denied")]
    AccessDenied,

    /// The referenced entry no longer exists in the calendar.
    #[error("calendar entry not found: {0}")]
    NotFound(CalendarEventRef),

    /// Collaborator-side failure.
    #[error("calendar request failed: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl CalendarGatewayError {
    /// Wraps a collaborator error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
