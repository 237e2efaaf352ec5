//! Reminder delivery boundary.
//!
//! # Responsibility
//! - Define the contract the host notification service must satisfy.
//! - Provide a process-local implementation for tests and embedders that
//!   bridge alerts to the OS themselves.
//!
//! # Invariants
//! - Alerts are keyed by task id: scheduling again replaces, never duplicates.
//! - Cancelling an unknown id is a no-op, not an error.

use crate::model::task::TaskId;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Outcome of asking the host for notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Granted,
    Denied,
}

/// Delivery-layer error. Always non-fatal for task data.
#[derive(Debug)]
pub enum ReminderError {
    /// Permission request could not be completed.
    Authorization(String),
    /// Alert registration or cancellation failed for one task.
    Delivery { id: TaskId, message: String },
}

impl Display for ReminderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authorization(message) => {
                write!(f, "notification authorization failed: {message}")
            }
            Self::Delivery { id, message } => {
                write!(f, "reminder delivery failed for task {id}: {message}")
            }
        }
    }
}

impl Error for ReminderError {}

/// One-shot alert registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    /// Task id, used as the alert key.
    pub id: TaskId,
    /// Fire time in epoch milliseconds, truncated to minute granularity.
    pub fire_at: i64,
    /// Alert title shown by the host.
    pub title: String,
    /// Alert body shown by the host.
    pub body: String,
}

/// Contract for the host's local notification service.
///
/// Fire-once semantics: delivery is fire-and-forget, and a past `fire_at` is
/// the host's problem to fire immediately or drop.
pub trait ReminderDelivery {
    fn request_authorization(&mut self) -> Result<AuthorizationStatus, ReminderError>;
    fn schedule(&mut self, request: &ReminderRequest) -> Result<(), ReminderError>;
    fn cancel(&mut self, id: TaskId) -> Result<(), ReminderError>;
}

/// Process-local delivery keeping pending alerts in a map.
///
/// Used by tests and by embedders that mirror the pending set into the real
/// OS notification center on their side of the boundary.
#[derive(Debug, Default)]
pub struct InMemoryReminderDelivery {
    pending: HashMap<TaskId, ReminderRequest>,
}

impl InMemoryReminderDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pending alert for one task id, if any.
    pub fn pending_for(&self, id: TaskId) -> Option<&ReminderRequest> {
        self.pending.get(&id)
    }

    /// Returns all pending alerts ordered by fire time, then id.
    pub fn pending(&self) -> Vec<ReminderRequest> {
        let mut requests: Vec<ReminderRequest> = self.pending.values().cloned().collect();
        requests.sort_by(|a, b| a.fire_at.cmp(&b.fire_at).then(a.id.cmp(&b.id)));
        requests
    }

    /// Number of pending alerts.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no alerts are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl ReminderDelivery for InMemoryReminderDelivery {
    fn request_authorization(&mut self) -> Result<AuthorizationStatus, ReminderError> {
        Ok(AuthorizationStatus::Granted)
    }

    fn schedule(&mut self, request: &ReminderRequest) -> Result<(), ReminderError> {
        // Same-key insert replaces any prior alert for this task.
        self.pending.insert(request.id, request.clone());
        Ok(())
    }

    fn cancel(&mut self, id: TaskId) -> Result<(), ReminderError> {
        self.pending.remove(&id);
        Ok(())
    }
}
