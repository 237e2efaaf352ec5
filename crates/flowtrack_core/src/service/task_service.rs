//! Task use-case service.
//!
//! # Responsibility
//! - Provide stable create/update/complete/delete/query entry points.
//! - Own the mutation -> commit -> reminder side-effect ordering.
//!
//! # Invariants
//! - Validation and not-found failures block the mutation entirely.
//! - Reminder registration runs only after a successful commit and its
//!   failure never rolls the data mutation back.
//! - A successful delete leaves no pending reminder for that id.

use crate::model::task::{Task, TaskDraft, TaskId};
use crate::query::engine::{run_query, QueryRequest};
use crate::reminder::delivery::{AuthorizationStatus, ReminderDelivery, ReminderError};
use crate::reminder::scheduler::ReminderScheduler;
use crate::repo::task_repo::{RepoError, RepoResult, TaskRepository};
use chrono::Utc;

/// Use-case service wrapper around one store handle and one scheduler.
///
/// Single logical writer: all mutations run synchronously on the caller's
/// thread, and a read after a returned mutation sees the committed state.
pub struct TaskService<R: TaskRepository, D: ReminderDelivery> {
    repo: R,
    scheduler: ReminderScheduler<D>,
}

impl<R: TaskRepository, D: ReminderDelivery> TaskService<R, D> {
    /// Creates a service from an explicitly passed store handle and scheduler.
    pub fn new(repo: R, scheduler: ReminderScheduler<D>) -> Self {
        Self { repo, scheduler }
    }

    /// Creates a new task from a draft and schedules its due-date reminder.
    ///
    /// # Contract
    /// - Blank titles fail with a validation error before any persistence call.
    /// - Assigns fresh `id` and `created_at`; `due_at` defaults to now.
    /// - The reminder is issued after commit; its failure is logged only.
    pub fn create_task(&mut self, draft: TaskDraft) -> RepoResult<Task> {
        draft.validate()?;

        let task = Task::new(draft, now_ms());
        self.repo.create_task(&task)?;
        // Reminder failures never unwind a committed create; the scheduler
        // already logged the outcome.
        let _ = self.scheduler.schedule_for(&task);
        Ok(task)
    }

    /// Overwrites an existing task with draft fields, preserving identity.
    ///
    /// # Contract
    /// - Unknown ids fail with `NotFound` and change nothing.
    /// - `id` and `created_at` are preserved; all other fields are replaced
    ///   atomically.
    /// - The reminder is re-issued only when the due date changed.
    pub fn update_task(&mut self, id: TaskId, draft: TaskDraft) -> RepoResult<Task> {
        draft.validate()?;

        let existing = self.repo.get_task(id)?.ok_or(RepoError::NotFound(id))?;
        let task = existing.apply(draft);
        self.repo.update_task(&task)?;

        if task.due_at != existing.due_at {
            // Same-key scheduling replaces the previous alert, no duplicates.
            let _ = self.scheduler.schedule_for(&task);
        }
        Ok(task)
    }

    /// Flips only the completion flag of one task.
    pub fn set_completed(&mut self, id: TaskId, completed: bool) -> RepoResult<()> {
        self.repo.set_completed(id, completed)
    }

    /// Deletes a task and cancels its pending reminder.
    ///
    /// # Contract
    /// - Unknown ids fail with `NotFound`.
    /// - Cancellation runs right after the successful commit, so no dangling
    ///   reminder survives a successful delete; its failure is logged only.
    pub fn delete_task(&mut self, id: TaskId) -> RepoResult<()> {
        self.repo.delete_task(id)?;
        let _ = self.scheduler.cancel(id);
        Ok(())
    }

    /// Gets one task by stable id.
    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.get_task(id)
    }

    /// Lists all tasks in the store's due-date ordering.
    pub fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks()
    }

    /// Computes the displayed list for one filter/search/sort request.
    pub fn query_tasks(&self, request: &QueryRequest) -> RepoResult<Vec<Task>> {
        let tasks = self.repo.list_tasks()?;
        Ok(run_query(&tasks, request, now_ms()))
    }

    /// Asks the host for notification permission.
    pub fn request_notification_authorization(
        &mut self,
    ) -> Result<AuthorizationStatus, ReminderError> {
        self.scheduler.request_authorization()
    }

    /// Read access to the scheduler, for inspection by embedders and tests.
    pub fn scheduler(&self) -> &ReminderScheduler<D> {
        &self.scheduler
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
