//! One-shot reminder scheduling over a delivery boundary.
//!
//! # Responsibility
//! - Build alert content from task fields.
//! - Forward schedule/cancel calls to the delivery with diagnostics logging.
//!
//! # Invariants
//! - Fire time is the due date truncated to minute granularity.
//! - Past due dates are passed through unchanged; the delivery layer fires
//!   them immediately or drops them.

use crate::model::task::{Task, TaskId};
use crate::reminder::delivery::{
    AuthorizationStatus, ReminderDelivery, ReminderError, ReminderRequest,
};
use log::{error, info, warn};

const MILLIS_PER_MINUTE: i64 = 60_000;
const DEFAULT_BODY: &str = "Your task is due now";

/// Schedules and cancels one-shot due-date alerts keyed by task id.
pub struct ReminderScheduler<D: ReminderDelivery> {
    delivery: D,
}

impl<D: ReminderDelivery> ReminderScheduler<D> {
    /// Creates a scheduler over the provided delivery implementation.
    pub fn new(delivery: D) -> Self {
        Self { delivery }
    }

    /// Asks the host for notification permission.
    ///
    /// A denied grant is reported, not treated as an error: tasks save fine
    /// without alerts.
    pub fn request_authorization(&mut self) -> Result<AuthorizationStatus, ReminderError> {
        match self.delivery.request_authorization() {
            Ok(status) => {
                info!(
                    "event=reminder_authorization module=reminder status=ok granted={}",
                    status == AuthorizationStatus::Granted
                );
                Ok(status)
            }
            Err(err) => {
                error!(
                    "event=reminder_authorization module=reminder status=error error={err}"
                );
                Err(err)
            }
        }
    }

    /// Registers (or replaces) the one-shot alert for a task's due date.
    pub fn schedule_for(&mut self, task: &Task) -> Result<(), ReminderError> {
        let request = reminder_request_for(task);
        match self.delivery.schedule(&request) {
            Ok(()) => {
                info!(
                    "event=reminder_schedule module=reminder status=ok task_id={} fire_at={}",
                    request.id, request.fire_at
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=reminder_schedule module=reminder status=error task_id={} error={err}",
                    request.id
                );
                Err(err)
            }
        }
    }

    /// Removes any pending alert for the given task id.
    pub fn cancel(&mut self, id: TaskId) -> Result<(), ReminderError> {
        match self.delivery.cancel(id) {
            Ok(()) => {
                info!("event=reminder_cancel module=reminder status=ok task_id={id}");
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=reminder_cancel module=reminder status=error task_id={id} error={err}"
                );
                Err(err)
            }
        }
    }

    /// Read access to the delivery, for inspection by embedders and tests.
    pub fn delivery(&self) -> &D {
        &self.delivery
    }
}

/// Builds the alert content for one task.
pub fn reminder_request_for(task: &Task) -> ReminderRequest {
    ReminderRequest {
        id: task.id,
        fire_at: truncate_to_minute(task.due_at),
        title: format!("Task Due: {}", task.title),
        body: if task.description.is_empty() {
            DEFAULT_BODY.to_string()
        } else {
            task.description.clone()
        },
    }
}

/// Truncates an epoch-millisecond timestamp to minute granularity.
pub fn truncate_to_minute(epoch_ms: i64) -> i64 {
    epoch_ms - epoch_ms.rem_euclid(MILLIS_PER_MINUTE)
}

#[cfg(test)]
mod tests {
    use super::truncate_to_minute;

    #[test]
    fn truncate_drops_seconds_and_millis() {
        assert_eq!(truncate_to_minute(0), 0);
        assert_eq!(truncate_to_minute(59_999), 0);
        assert_eq!(truncate_to_minute(60_000), 60_000);
        assert_eq!(truncate_to_minute(61_500), 60_000);
    }

    #[test]
    fn truncate_is_stable_for_pre_epoch_times() {
        assert_eq!(truncate_to_minute(-1), -60_000);
        assert_eq!(truncate_to_minute(-60_000), -60_000);
    }
}
