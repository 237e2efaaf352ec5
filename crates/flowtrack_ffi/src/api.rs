//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level task functions to Dart via FRB.
//! - Keep error semantics simple for the mobile UI integration.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Pending reminders live in a process-local ledger; the Dart side mirrors
//!   it into the OS notification center after each mutation.

use flowtrack_core::db::open_db;
use flowtrack_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AuthorizationStatus, Category, InMemoryReminderDelivery, Priority, QueryRequest,
    ReminderDelivery, ReminderError, ReminderRequest, ReminderScheduler, RepoResult,
    SqliteTaskRepository, Task, TaskDraft, TaskFilter, TaskId, TaskService, TaskSort,
};
use log::debug;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use uuid::Uuid;

const TASK_DB_FILE_NAME: &str = "flowtrack_tasks.sqlite3";
static TASK_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static REMINDER_LEDGER: OnceLock<Mutex<InMemoryReminderDelivery>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Task payload returned to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    /// Stable task ID in string form.
    pub task_id: String,
    pub title: String,
    pub description: String,
    pub due_at_epoch_ms: i64,
    /// Priority label (`low|medium|high`).
    pub priority: String,
    /// Category label (`work|personal|shopping|health|other`).
    pub category: String,
    pub tags: Vec<String>,
    pub is_completed: bool,
    pub created_at_epoch_ms: i64,
}

/// Generic action response envelope for task mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Stable ID of the affected task, when one exists.
    pub task_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task_id: String) -> Self {
        Self {
            ok: true,
            task_id: Some(task_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// List response envelope for the displayed task collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// Tasks in display order (empty on failure).
    pub items: Vec<TaskItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Pending one-shot alert, mirrored by the host into the OS center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub task_id: String,
    pub fire_at_epoch_ms: i64,
    pub title: String,
    pub body: String,
}

/// Authorization outcome envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub granted: bool,
    pub message: String,
}

/// Creates a task and schedules its due-date reminder.
///
/// Input semantics:
/// - `due_at_epoch_ms = None` defaults the due date to "now".
/// - Unknown `priority`/`category` labels fall back to medium/personal.
/// - Surrounding whitespace on `title` is trimmed before validation.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns operation result and created task ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn create_task(
    title: String,
    description: String,
    due_at_epoch_ms: Option<i64>,
    priority: String,
    category: String,
    tags: Vec<String>,
) -> TaskActionResponse {
    let draft = TaskDraft {
        title: title.trim().to_string(),
        description: description.trim().to_string(),
        due_at: due_at_epoch_ms,
        priority: Priority::parse(&priority).unwrap_or_default(),
        category: Category::parse(&category).unwrap_or_default(),
        tags,
        is_completed: false,
    };
    match with_task_service(|service| service.create_task(draft)) {
        Ok(task) => TaskActionResponse::success("Task created.", task.id.to_string()),
        Err(err) => TaskActionResponse::failure(format!("create_task failed: {err}")),
    }
}

/// Overwrites an existing task, preserving its identity and creation time.
///
/// Input semantics:
/// - `due_at_epoch_ms = None` keeps the stored due date.
/// - Unknown `priority`/`category` labels fall back to medium/personal.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns operation result and the task ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn update_task(
    task_id: String,
    title: String,
    description: String,
    due_at_epoch_ms: Option<i64>,
    priority: String,
    category: String,
    tags: Vec<String>,
    is_completed: bool,
) -> TaskActionResponse {
    let id = match parse_task_id(&task_id) {
        Ok(id) => id,
        Err(message) => return TaskActionResponse::failure(message),
    };
    let draft = TaskDraft {
        title: title.trim().to_string(),
        description: description.trim().to_string(),
        due_at: due_at_epoch_ms,
        priority: Priority::parse(&priority).unwrap_or_default(),
        category: Category::parse(&category).unwrap_or_default(),
        tags,
        is_completed,
    };
    match with_task_service(|service| service.update_task(id, draft)) {
        Ok(task) => TaskActionResponse::success("Task updated.", task.id.to_string()),
        Err(err) => TaskActionResponse::failure(format!("update_task failed: {err}")),
    }
}

/// Flips only the completion flag of one task.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn set_task_completed(task_id: String, completed: bool) -> TaskActionResponse {
    let id = match parse_task_id(&task_id) {
        Ok(id) => id,
        Err(message) => return TaskActionResponse::failure(message),
    };
    match with_task_service(|service| service.set_completed(id, completed).map(|()| id)) {
        Ok(id) => TaskActionResponse::success("Task completion updated.", id.to_string()),
        Err(err) => TaskActionResponse::failure(format!("set_task_completed failed: {err}")),
    }
}

/// Deletes a task and cancels its pending reminder.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_task(task_id: String) -> TaskActionResponse {
    let id = match parse_task_id(&task_id) {
        Ok(id) => id,
        Err(message) => return TaskActionResponse::failure(message),
    };
    match with_task_service(|service| service.delete_task(id).map(|()| id)) {
        Ok(id) => TaskActionResponse::success("Task deleted.", id.to_string()),
        Err(err) => TaskActionResponse::failure(format!("delete_task failed: {err}")),
    }
}

/// Computes the displayed task list for one filter/search/sort request.
///
/// Input semantics:
/// - Unknown `filter` labels pass through unfiltered.
/// - Unknown `sort` labels fall back to due-date ordering.
/// - Blank `search` text is a pass-through.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns tasks in display order with a diagnostics message.
#[flutter_rust_bridge::frb(sync)]
pub fn list_tasks(filter: String, search: String, sort: String) -> TaskListResponse {
    let request = QueryRequest {
        filter: TaskFilter::parse(&filter),
        search,
        sort: TaskSort::parse(&sort),
    };
    match with_task_service(|service| service.query_tasks(&request)) {
        Ok(tasks) => {
            let items = tasks.into_iter().map(to_task_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No tasks.".to_string()
            } else {
                format!("Found {} task(s).", items.len())
            };
            TaskListResponse { items, message }
        }
        Err(err) => TaskListResponse {
            items: Vec::new(),
            message: format!("list_tasks failed: {err}"),
        },
    }
}

/// Asks the notification boundary for permission.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; a failed request reports `granted = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn request_notification_authorization() -> AuthorizationResponse {
    let mut scheduler = ReminderScheduler::new(ProcessReminderLedger);
    match scheduler.request_authorization() {
        Ok(AuthorizationStatus::Granted) => AuthorizationResponse {
            granted: true,
            message: "Notification permission granted.".to_string(),
        },
        Ok(AuthorizationStatus::Denied) => AuthorizationResponse {
            granted: false,
            message: "Notification permission denied.".to_string(),
        },
        Err(err) => AuthorizationResponse {
            granted: false,
            message: format!("request_notification_authorization failed: {err}"),
        },
    }
}

/// Returns all pending reminders ordered by fire time.
///
/// The host reads this after each mutation and mirrors the set into the OS
/// notification center (register/replace/remove by task id).
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn pending_reminders() -> Vec<ReminderItem> {
    let items: Vec<ReminderItem> = lock_ledger()
        .pending()
        .into_iter()
        .map(|request| ReminderItem {
            task_id: request.id.to_string(),
            fire_at_epoch_ms: request.fire_at,
            title: request.title,
            body: request.body,
        })
        .collect();
    debug!("event=reminder_ledger_read module=ffi status=ok count={}", items.len());
    items
}

/// Process-local reminder delivery shared by every FFI call.
struct ProcessReminderLedger;

impl ReminderDelivery for ProcessReminderLedger {
    fn request_authorization(&mut self) -> Result<AuthorizationStatus, ReminderError> {
        lock_ledger().request_authorization()
    }

    fn schedule(&mut self, request: &ReminderRequest) -> Result<(), ReminderError> {
        lock_ledger().schedule(request)
    }

    fn cancel(&mut self, id: TaskId) -> Result<(), ReminderError> {
        lock_ledger().cancel(id)
    }
}

fn lock_ledger() -> MutexGuard<'static, InMemoryReminderDelivery> {
    REMINDER_LEDGER
        .get_or_init(|| Mutex::new(InMemoryReminderDelivery::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn resolve_db_path() -> PathBuf {
    TASK_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("FLOWTRACK_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(TASK_DB_FILE_NAME)
        })
        .clone()
}

fn with_task_service<T>(
    f: impl FnOnce(&mut TaskService<SqliteTaskRepository<'_>, ProcessReminderLedger>) -> RepoResult<T>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let mut conn = open_db(&db_path).map_err(|err| format!("task DB open failed: {err}"))?;
    let repo = SqliteTaskRepository::try_new(&mut conn)
        .map_err(|err| format!("task repo init failed: {err}"))?;
    let mut service = TaskService::new(repo, ReminderScheduler::new(ProcessReminderLedger));
    f(&mut service).map_err(|err| err.to_string())
}

fn parse_task_id(value: &str) -> Result<TaskId, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("invalid task id `{value}`"))
}

fn to_task_item(task: Task) -> TaskItem {
    TaskItem {
        task_id: task.id.to_string(),
        title: task.title,
        description: task.description,
        due_at_epoch_ms: task.due_at,
        priority: task.priority.as_str().to_string(),
        category: task.category.as_str().to_string(),
        tags: task.tags,
        is_completed: task.is_completed,
        created_at_epoch_ms: task.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, create_task, delete_task, init_logging, list_tasks, pending_reminders,
        ping, request_notification_authorization, set_task_completed,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn create_task_appears_in_list_and_reminder_ledger() {
        let token = unique_token("ffi-create");
        let created = create_default_task(&token);
        assert!(created.ok, "{}", created.message);
        let created_id = created
            .task_id
            .clone()
            .expect("created task should return task_id");

        let listed = list_tasks("all".to_string(), token, "due_date".to_string());
        assert!(listed.items.iter().any(|item| item.task_id == created_id));

        assert!(pending_reminders()
            .iter()
            .any(|item| item.task_id == created_id));
    }

    #[test]
    fn create_task_rejects_blank_title() {
        let response = create_task(
            "   ".to_string(),
            String::new(),
            None,
            "medium".to_string(),
            "personal".to_string(),
            Vec::new(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("title"));
    }

    #[test]
    fn create_task_stores_defensive_defaults_for_unknown_labels() {
        let token = unique_token("ffi-labels");
        let created = create_task(
            format!("task {token}"),
            String::new(),
            Some(1_900_000_000_000),
            "urgent".to_string(),
            "garden".to_string(),
            Vec::new(),
        );
        assert!(created.ok, "{}", created.message);
        let created_id = created.task_id.expect("task_id");

        let conn = flowtrack_core::db::open_db(super::resolve_db_path()).expect("open db");
        let (priority, category): (String, String) = conn
            .query_row(
                "SELECT priority, category FROM tasks WHERE id = ?1",
                [created_id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("query task row");
        assert_eq!(priority, "medium");
        assert_eq!(category, "personal");
    }

    #[test]
    fn unknown_filter_label_passes_through_unfiltered() {
        let token = unique_token("ffi-filter");
        let created = create_default_task(&token);
        assert!(created.ok, "{}", created.message);
        let created_id = created.task_id.expect("task_id");

        let listed = list_tasks("someday".to_string(), token, "due_date".to_string());
        assert!(listed.items.iter().any(|item| item.task_id == created_id));
    }

    #[test]
    fn set_task_completed_moves_task_between_filters() {
        let token = unique_token("ffi-complete");
        let created = create_default_task(&token);
        let created_id = created.task_id.expect("task_id");

        let toggled = set_task_completed(created_id.clone(), true);
        assert!(toggled.ok, "{}", toggled.message);

        let completed = list_tasks(
            "completed".to_string(),
            token.clone(),
            "due_date".to_string(),
        );
        assert!(completed
            .items
            .iter()
            .any(|item| item.task_id == created_id && item.is_completed));

        let incomplete = list_tasks("incomplete".to_string(), token, "due_date".to_string());
        assert!(!incomplete.items.iter().any(|item| item.task_id == created_id));
    }

    #[test]
    fn delete_task_clears_list_and_reminder_ledger() {
        let token = unique_token("ffi-delete");
        let created = create_default_task(&token);
        let created_id = created.task_id.expect("task_id");

        let deleted = delete_task(created_id.clone());
        assert!(deleted.ok, "{}", deleted.message);

        let listed = list_tasks("all".to_string(), token, "due_date".to_string());
        assert!(!listed.items.iter().any(|item| item.task_id == created_id));

        assert!(!pending_reminders()
            .iter()
            .any(|item| item.task_id == created_id));
    }

    #[test]
    fn delete_task_rejects_malformed_id() {
        let response = delete_task("not-a-uuid".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid task id"));
    }

    #[test]
    fn authorization_is_granted_by_process_ledger() {
        let response = request_notification_authorization();
        assert!(response.granted, "{}", response.message);
    }

    fn create_default_task(token: &str) -> super::TaskActionResponse {
        create_task(
            format!("task {token}"),
            String::new(),
            Some(1_900_000_000_000),
            "medium".to_string(),
            "personal".to_string(),
            Vec::new(),
        )
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
