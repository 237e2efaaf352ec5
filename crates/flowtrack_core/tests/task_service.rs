use chrono::Utc;
use flowtrack_core::db::open_db_in_memory;
use flowtrack_core::{
    AuthorizationStatus, Category, InMemoryReminderDelivery, Priority, QueryRequest,
    ReminderDelivery, ReminderError, ReminderRequest, ReminderScheduler, RepoError,
    SqliteTaskRepository, TaskDraft, TaskFilter, TaskService, TaskSort,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn create_assigns_identity_and_schedules_reminder() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let due_at = 1_700_000_040_000 + 12_345;
    let task = service
        .create_task(TaskDraft {
            title: "dentist".to_string(),
            due_at: Some(due_at),
            ..TaskDraft::default()
        })
        .unwrap();

    assert!(task.created_at > 0);
    let loaded = service.get_task(task.id).unwrap().unwrap();
    assert_eq!(loaded, task);

    let pending = service.scheduler().delivery().pending_for(task.id).unwrap();
    assert_eq!(pending.fire_at, due_at - due_at.rem_euclid(60_000));
    assert_eq!(pending.title, "Task Due: dentist");
}

#[test]
fn create_defaults_due_date_to_now() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let before = Utc::now().timestamp_millis();
    let task = service
        .create_task(TaskDraft::with_title("no due date picked"))
        .unwrap();
    let after = Utc::now().timestamp_millis();

    assert!(task.due_at >= before && task.due_at <= after);
    assert_eq!(task.due_at, task.created_at);
}

#[test]
fn create_with_blank_title_persists_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut service = service(&mut conn);

        let err = service.create_task(TaskDraft::with_title("  ")).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(service.list_tasks().unwrap().is_empty());
        assert!(service.scheduler().delivery().is_empty());
    }

    let row_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(row_count, 0);
}

#[test]
fn update_round_trip_preserves_identity_and_replaces_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let created = service
        .create_task(TaskDraft {
            title: "draft".to_string(),
            due_at: Some(60_000),
            ..TaskDraft::default()
        })
        .unwrap();

    let updated = service
        .update_task(
            created.id,
            TaskDraft {
                title: "final".to_string(),
                description: "reviewed".to_string(),
                due_at: Some(240_000),
                priority: Priority::High,
                category: Category::Work,
                tags: vec!["deadline".to_string(), "q3".to_string()],
                is_completed: false,
            },
        )
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);

    let loaded = service.get_task(created.id).unwrap().unwrap();
    assert_eq!(loaded.title, "final");
    assert_eq!(loaded.description, "reviewed");
    assert_eq!(loaded.due_at, 240_000);
    assert_eq!(loaded.priority, Priority::High);
    assert_eq!(loaded.category, Category::Work);
    assert_eq!(loaded.tags, vec!["deadline".to_string(), "q3".to_string()]);
}

#[test]
fn update_reschedules_reminder_only_when_due_date_changes() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let created = service
        .create_task(TaskDraft {
            title: "watch due date".to_string(),
            due_at: Some(60_000),
            ..TaskDraft::default()
        })
        .unwrap();

    // Title-only edit: the pending alert is left untouched.
    service
        .update_task(
            created.id,
            TaskDraft {
                title: "renamed".to_string(),
                due_at: Some(60_000),
                ..TaskDraft::default()
            },
        )
        .unwrap();
    let untouched = service
        .scheduler()
        .delivery()
        .pending_for(created.id)
        .unwrap();
    assert_eq!(untouched.fire_at, 60_000);
    assert_eq!(untouched.title, "Task Due: watch due date");

    // Due-date edit: the alert is replaced, not duplicated.
    service
        .update_task(
            created.id,
            TaskDraft {
                title: "renamed".to_string(),
                due_at: Some(240_000),
                ..TaskDraft::default()
            },
        )
        .unwrap();
    assert_eq!(service.scheduler().delivery().len(), 1);
    let replaced = service
        .scheduler()
        .delivery()
        .pending_for(created.id)
        .unwrap();
    assert_eq!(replaced.fire_at, 240_000);
    assert_eq!(replaced.title, "Task Due: renamed");
}

#[test]
fn update_unknown_id_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let ghost = Uuid::new_v4();
    let err = service
        .update_task(ghost, TaskDraft::with_title("nobody home"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == ghost));
}

#[test]
fn set_completed_flips_only_the_flag() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let task = service
        .create_task(TaskDraft::with_title("toggle me"))
        .unwrap();

    service.set_completed(task.id, true).unwrap();
    let loaded = service.get_task(task.id).unwrap().unwrap();
    assert!(loaded.is_completed);
    assert_eq!(loaded.title, "toggle me");
}

#[test]
fn delete_removes_task_and_cancels_reminder() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let task = service
        .create_task(TaskDraft {
            title: "short lived".to_string(),
            due_at: Some(60_000),
            ..TaskDraft::default()
        })
        .unwrap();
    assert!(service.scheduler().delivery().pending_for(task.id).is_some());

    service.delete_task(task.id).unwrap();

    assert!(service.get_task(task.id).unwrap().is_none());
    assert!(service
        .query_tasks(&QueryRequest::default())
        .unwrap()
        .is_empty());
    assert!(service.scheduler().delivery().pending_for(task.id).is_none());
}

#[test]
fn delete_unknown_id_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let ghost = Uuid::new_v4();
    let err = service.delete_task(ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == ghost));
}

#[test]
fn reminder_failure_never_blocks_the_data_mutation() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&mut conn).unwrap();
    let mut service = TaskService::new(repo, ReminderScheduler::new(RefusingDelivery));

    let task = service
        .create_task(TaskDraft::with_title("saved anyway"))
        .unwrap();

    let loaded = service.get_task(task.id).unwrap().unwrap();
    assert_eq!(loaded.title, "saved anyway");

    service.delete_task(task.id).unwrap();
    assert!(service.get_task(task.id).unwrap().is_none());
}

#[test]
fn pay_rent_scenario_flows_through_filters_and_priority_sort() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let tomorrow_nine = Utc::now().timestamp_millis() + 24 * 60 * 60 * 1_000;
    let pay_rent = service
        .create_task(TaskDraft {
            title: "Pay rent".to_string(),
            due_at: Some(tomorrow_nine),
            priority: Priority::High,
            ..TaskDraft::default()
        })
        .unwrap();
    service
        .create_task(TaskDraft {
            title: "water plants".to_string(),
            due_at: Some(tomorrow_nine),
            ..TaskDraft::default()
        })
        .unwrap();

    let all = service
        .query_tasks(&query(TaskFilter::All, "", TaskSort::DueDate))
        .unwrap();
    assert!(all.iter().any(|task| task.id == pay_rent.id));

    let incomplete = service
        .query_tasks(&query(TaskFilter::Incomplete, "", TaskSort::DueDate))
        .unwrap();
    assert!(incomplete.iter().any(|task| task.id == pay_rent.id));

    let overdue = service
        .query_tasks(&query(TaskFilter::Overdue, "", TaskSort::DueDate))
        .unwrap();
    assert!(overdue.is_empty());

    let by_priority = service
        .query_tasks(&query(TaskFilter::All, "", TaskSort::Priority))
        .unwrap();
    assert_eq!(by_priority[0].id, pay_rent.id);
}

#[test]
fn search_reaches_tags_through_the_service() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let mut draft = TaskDraft::with_title("groceries");
    draft.tags = vec!["Milk".to_string()];
    let tagged = service.create_task(draft).unwrap();
    service
        .create_task(TaskDraft::with_title("water plants"))
        .unwrap();

    let hits = service
        .query_tasks(&query(TaskFilter::All, "milk", TaskSort::DueDate))
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, tagged.id);
}

#[test]
fn service_grants_authorization_through_in_memory_delivery() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let status = service.request_notification_authorization().unwrap();
    assert_eq!(status, AuthorizationStatus::Granted);
}

struct RefusingDelivery;

impl ReminderDelivery for RefusingDelivery {
    fn request_authorization(&mut self) -> Result<AuthorizationStatus, ReminderError> {
        Ok(AuthorizationStatus::Denied)
    }

    fn schedule(&mut self, request: &ReminderRequest) -> Result<(), ReminderError> {
        Err(ReminderError::Delivery {
            id: request.id,
            message: "delivery offline".to_string(),
        })
    }

    fn cancel(&mut self, id: Uuid) -> Result<(), ReminderError> {
        Err(ReminderError::Delivery {
            id,
            message: "delivery offline".to_string(),
        })
    }
}

fn service(
    conn: &mut Connection,
) -> TaskService<SqliteTaskRepository<'_>, InMemoryReminderDelivery> {
    let repo = SqliteTaskRepository::try_new(conn).unwrap();
    TaskService::new(repo, ReminderScheduler::new(InMemoryReminderDelivery::new()))
}

fn query(filter: TaskFilter, search: &str, sort: TaskSort) -> QueryRequest {
    QueryRequest {
        filter,
        search: search.to_string(),
        sort,
    }
}
