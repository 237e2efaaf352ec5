//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `flowtrack_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use flowtrack_core::db::open_db_in_memory;
use flowtrack_core::{
    InMemoryReminderDelivery, ReminderScheduler, SqliteTaskRepository, TaskDraft, TaskService,
};

fn main() {
    println!("flowtrack_core ping={}", flowtrack_core::ping());
    println!("flowtrack_core version={}", flowtrack_core::core_version());

    // Exercise the real stack end to end against an in-memory store, so the
    // probe fails loudly when schema or service wiring regresses.
    match smoke_probe() {
        Ok(count) => println!("flowtrack_core smoke_tasks={count}"),
        Err(err) => {
            eprintln!("flowtrack_core smoke_failed={err}");
            std::process::exit(1);
        }
    }
}

fn smoke_probe() -> Result<usize, Box<dyn std::error::Error>> {
    let mut conn = open_db_in_memory()?;
    let repo = SqliteTaskRepository::try_new(&mut conn)?;
    let scheduler = ReminderScheduler::new(InMemoryReminderDelivery::new());
    let mut service = TaskService::new(repo, scheduler);

    service.create_task(TaskDraft::with_title("smoke probe"))?;
    Ok(service.list_tasks()?.len())
}
