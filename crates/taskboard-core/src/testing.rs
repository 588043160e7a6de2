//! Test fixtures shared by the unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{Task, TaskId, TaskPriority, TaskStatus};

pub(crate) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub(crate) fn task(id: &str, title: &str) -> Task {
    Task {
        id: TaskId::new(id),
        title: title.to_string(),
        description: None,
        due_date: None,
        photo: None,
        completed: false,
        created_at: at(2024, 1, 1),
        updated_at: at(2024, 1, 1),
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
    }
}

/// todo/high（期限あり）、in_progress/medium、done/low（完了）の 3 件
pub(crate) fn sample_tasks() -> Vec<Task> {
    let mut t1 = task("1", "Task 1");
    t1.description = Some("Description 1".to_string());
    t1.priority = TaskPriority::High;
    t1.due_date = Some(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap());

    let mut t2 = task("2", "Task 2");
    t2.description = Some("Description 2".to_string());
    t2.status = TaskStatus::InProgress;
    t2.created_at = at(2024, 1, 2);
    t2.updated_at = at(2024, 1, 2);

    let mut t3 = task("3", "Task 3");
    t3.description = Some("Description 3".to_string());
    t3.status = TaskStatus::Done;
    t3.priority = TaskPriority::Low;
    t3.completed = true;
    t3.created_at = at(2024, 1, 3);
    t3.updated_at = at(2024, 1, 3);

    vec![t1, t2, t3]
}
