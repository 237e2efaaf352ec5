//! Pure filter/search/sort pipeline over task snapshots.
//!
//! # Responsibility
//! - Apply filter, free-text search and sort to a task collection.
//! - Stay side-effect free: callers pass snapshots and the wall clock in.
//!
//! # Invariants
//! - Filter runs before search, search before sort; sorting must see the
//!   fully filtered set to stay deterministic.
//! - Every sort is stable: ties keep input order, re-sorting is idempotent.
//! - `Overdue` treats any `due_at < now` uniformly, including earlier today.

use crate::model::task::Task;
use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Collection filter applied before search and sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    /// Identity filter, every task passes.
    #[default]
    All,
    Completed,
    Incomplete,
    /// Due date falls on the current calendar day in local time.
    Today,
    /// Due date strictly before now and not completed.
    Overdue,
}

impl TaskFilter {
    /// Stable FFI label for this filter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Today => "today",
            Self::Overdue => "overdue",
        }
    }

    /// Parses an FFI label. Unrecognized values pass through unfiltered.
    pub fn parse(value: &str) -> Self {
        match value {
            "completed" => Self::Completed,
            "incomplete" => Self::Incomplete,
            "today" => Self::Today,
            "overdue" => Self::Overdue,
            _ => Self::All,
        }
    }
}

/// Sort key applied after filter and search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSort {
    /// Ascending by due date.
    #[default]
    DueDate,
    /// Descending by severity (high > medium > low).
    Priority,
    /// Ascending lexicographic by title.
    Title,
    /// Descending by creation time.
    CreationDate,
}

impl TaskSort {
    /// Stable FFI label for this sort key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DueDate => "due_date",
            Self::Priority => "priority",
            Self::Title => "title",
            Self::CreationDate => "creation_date",
        }
    }

    /// Parses an FFI label. Unrecognized values fall back to due date.
    pub fn parse(value: &str) -> Self {
        match value {
            "priority" => Self::Priority,
            "title" => Self::Title,
            "creation_date" => Self::CreationDate,
            _ => Self::DueDate,
        }
    }
}

/// One displayed-list request: filter, free-text search and sort key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    pub filter: TaskFilter,
    pub search: String,
    pub sort: TaskSort,
}

/// Computes the displayed ordering for a task snapshot.
///
/// Pure function of (collection, request, wall clock); the input slice is
/// never mutated.
pub fn run_query(tasks: &[Task], request: &QueryRequest, now_ms: i64) -> Vec<Task> {
    let needle = request.search.trim().to_lowercase();

    let mut result: Vec<Task> = tasks
        .iter()
        .filter(|task| matches_filter(task, request.filter, now_ms))
        .filter(|task| needle.is_empty() || matches_search(task, &needle))
        .cloned()
        .collect();

    // Vec::sort_by is stable, which keeps equal keys in input order.
    result.sort_by(comparator(request.sort));
    result
}

fn matches_filter(task: &Task, filter: TaskFilter, now_ms: i64) -> bool {
    match filter {
        TaskFilter::All => true,
        TaskFilter::Completed => task.is_completed,
        TaskFilter::Incomplete => !task.is_completed,
        TaskFilter::Today => is_same_local_day(task.due_at, now_ms),
        TaskFilter::Overdue => task.is_overdue(now_ms),
    }
}

fn matches_search(task: &Task, needle_lowercase: &str) -> bool {
    task.title.to_lowercase().contains(needle_lowercase)
        || task.description.to_lowercase().contains(needle_lowercase)
        || task
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle_lowercase))
}

fn comparator(sort: TaskSort) -> fn(&Task, &Task) -> Ordering {
    match sort {
        TaskSort::DueDate => |a, b| a.due_at.cmp(&b.due_at),
        TaskSort::Priority => |a, b| b.priority.cmp(&a.priority),
        TaskSort::Title => |a, b| a.title.cmp(&b.title),
        TaskSort::CreationDate => |a, b| b.created_at.cmp(&a.created_at),
    }
}

fn is_same_local_day(due_at_ms: i64, now_ms: i64) -> bool {
    match (local_day(due_at_ms), local_day(now_ms)) {
        (Some(due_day), Some(today)) => due_day == today,
        // Unrepresentable local instants (DST gaps) never count as today.
        _ => false,
    }
}

fn local_day(epoch_ms: i64) -> Option<NaiveDate> {
    Local
        .timestamp_millis_opt(epoch_ms)
        .single()
        .map(|dt| dt.date_naive())
}
