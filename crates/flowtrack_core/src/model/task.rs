//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical persisted task record and its field defaults.
//! - Provide validation helpers shared by every write path.
//!
//! # Invariants
//! - `id` is stable, never reused, and doubles as the reminder key.
//! - `created_at` is set on first creation and preserved across edits.
//! - A task with a blank title must never reach persistence.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Task urgency level.
///
/// Declaration order is severity order, so the derived `Ord` ranks
/// `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Stable storage/FFI label for this priority.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a storage/FFI label. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Closed set of task categories shown by the mobile UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Work,
    #[default]
    Personal,
    Shopping,
    Health,
    Other,
}

impl Category {
    /// Stable storage/FFI label for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Shopping => "shopping",
            Self::Health => "health",
            Self::Other => "other",
        }
    }

    /// Parses a storage/FFI label. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "work" => Some(Self::Work),
            "personal" => Some(Self::Personal),
            "shopping" => Some(Self::Shopping),
            "health" => Some(Self::Health),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Validation failure raised before any persistence call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable global ID used for persistence and reminder keying.
    pub id: TaskId,
    /// Short display title. Required for save.
    pub title: String,
    /// Free-form body text. Empty when the user entered none.
    pub description: String,
    /// Due timestamp in epoch milliseconds.
    pub due_at: i64,
    /// Urgency level, defaults to medium.
    pub priority: Priority,
    /// UI category, defaults to personal.
    pub category: Category,
    /// Ordered, case-preserved tag labels.
    pub tags: Vec<String>,
    /// Completion state toggled independently of edits.
    pub is_completed: bool,
    /// Creation timestamp in epoch milliseconds. Never changes on edit.
    pub created_at: i64,
}

/// Caller-supplied field set for create/update operations.
///
/// Everything except `id`/`created_at` is overwritable. `due_at` is optional:
/// on create it defaults to "now", on update it keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_at: Option<i64>,
    pub priority: Priority,
    pub category: Category,
    pub tags: Vec<String>,
    pub is_completed: bool,
}

impl TaskDraft {
    /// Convenience constructor for the common title-only case.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Rejects drafts that must not reach persistence.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }
}

impl Task {
    /// Creates a new task from a draft, assigning identity and creation time.
    ///
    /// # Invariants
    /// - `id` is freshly generated and never reused.
    /// - `due_at` falls back to `now_ms` when the draft leaves it unset.
    pub fn new(draft: TaskDraft, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            due_at: draft.due_at.unwrap_or(now_ms),
            priority: draft.priority,
            category: draft.category,
            tags: draft.tags,
            is_completed: draft.is_completed,
            created_at: now_ms,
        }
    }

    /// Applies an edit draft onto this task, preserving `id`/`created_at`.
    pub fn apply(&self, draft: TaskDraft) -> Self {
        Self {
            id: self.id,
            title: draft.title,
            description: draft.description,
            due_at: draft.due_at.unwrap_or(self.due_at),
            priority: draft.priority,
            category: draft.category,
            tags: draft.tags,
            is_completed: draft.is_completed,
            created_at: self.created_at,
        }
    }

    /// Rejects records that must not reach persistence.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Returns whether this task is past due and still open.
    pub fn is_overdue(&self, now_ms: i64) -> bool {
        self.due_at < now_ms && !self.is_completed
    }
}
