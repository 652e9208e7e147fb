//! Notification collaborator port.

use crate::task::domain::ReminderId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for reminder gateway operations.
pub type ReminderGatewayResult<T> = Result<T, ReminderGatewayError>;

/// One reminder to be delivered at a fixed time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    /// Identifier used for later cancellation.
    pub id: ReminderId,
    /// Delivery time.
    pub fire_at: DateTime<Utc>,
    /// Notification headline.
    pub title: String,
    /// Notification body, typically the task title.
    pub body: String,
}

/// Notification collaborator contract.
///
/// Scheduling and cancellation are best effort; a later request for the
/// same reminder identifier supersedes the earlier one.
#[async_trait]
pub trait ReminderGateway: Send + Sync {
    /// Returns whether notification delivery has been granted.
    fn is_authorized(&self) -> bool;

    /// Requests notification access from the platform; returns the grant.
    async fn request_access(&self) -> bool;

    /// Schedules a reminder for delivery at its fire time.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderGatewayError::AccessDenied`] without authorization
    /// or [`ReminderGatewayError::Backend`] on collaborator failure.
    async fn schedule_at(&self, request: ReminderRequest) -> ReminderGatewayResult<()>;

    /// Cancels a pending reminder.
    ///
    /// Idempotent: cancelling a reminder that was never scheduled, already
    /// fired, or already cancelled succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderGatewayError::Backend`] on collaborator failure.
    async fn cancel(&self, id: ReminderId) -> ReminderGatewayResult<()>;
}

/// Errors returned by reminder gateway implementations.
#[derive(Debug, Clone, Error)]
pub enum ReminderGatewayError {
    /// The user has not granted notification delivery.
    #[error("notification access denied")]
    AccessDenied,

    /// Collaborator-side failure.
    #[error("reminder request failed: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl ReminderGatewayError {
    /// Wraps a collaborator error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
