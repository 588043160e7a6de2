//! Human / JSON rendering of command results.

use chrono::{DateTime, Utc};
use serde::Serialize;

use taskboard_core::derive::{TaskStats, TasksByStatus, days_until_due};
use taskboard_core::{Task, TaskId, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn due_label(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match due {
        None => "-".to_string(),
        Some(due) => {
            let days = days_until_due(due, now);
            let when = match days {
                d if d < 0 => format!("{} days overdue", -d),
                0 => "today".to_string(),
                1 => "tomorrow".to_string(),
                d => format!("in {d} days"),
            };
            format!("{} ({when})", due.format("%Y-%m-%d"))
        }
    }
}

fn task_line(task: &Task, now: DateTime<Utc>) -> String {
    let check = if task.completed { "x" } else { " " };
    format!(
        "[{check}] {:<26} {:<11} {:<6} {:<40} due {}",
        task.id,
        task.status.as_str(),
        task.priority.as_str(),
        task.title,
        due_label(task.due_date, now)
    )
}

pub fn print_tasks(mode: OutputMode, tasks: &[Task]) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        return print_json(tasks);
    }
    if tasks.is_empty() {
        println!("no tasks");
        return Ok(());
    }
    let now = Utc::now();
    for task in tasks {
        println!("{}", task_line(task, now));
    }
    Ok(())
}

pub fn print_task(mode: OutputMode, task: &Task) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        return print_json(task);
    }
    let now = Utc::now();
    println!("id:          {}", task.id);
    println!("title:       {}", task.title);
    if let Some(description) = &task.description {
        println!("description: {description}");
    }
    println!("status:      {}", task.status.label());
    println!("priority:    {}", task.priority.as_str());
    println!("completed:   {}", task.completed);
    println!("due:         {}", due_label(task.due_date, now));
    if let Some(photo) = &task.photo {
        println!("photo:       {photo}");
    }
    println!("created:     {}", task.created_at.to_rfc3339());
    println!("updated:     {}", task.updated_at.to_rfc3339());
    Ok(())
}

pub fn print_stats(mode: OutputMode, stats: &TaskStats) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        return print_json(stats);
    }
    println!("total:     {}", stats.total);
    println!("completed: {}", stats.completed);
    println!("pending:   {}", stats.pending);
    println!("overdue:   {}", stats.overdue);
    println!("progress:  {}%", stats.completion_rate);
    Ok(())
}

pub fn print_board(mode: OutputMode, board: &TasksByStatus) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        return print_json(board);
    }
    let now = Utc::now();
    for status in TaskStatus::ALL {
        let bucket = board.bucket(status);
        println!("== {} ({}) ==", status.label(), bucket.len());
        for task in bucket {
            println!("  {}", task_line(task, now));
        }
    }
    Ok(())
}

pub fn print_nearest(mode: OutputMode, task: Option<&Task>) -> anyhow::Result<()> {
    match (mode, task) {
        (OutputMode::Json, task) => print_json(&task),
        (OutputMode::Human, Some(task)) => print_task(mode, task),
        (OutputMode::Human, None) => {
            println!("no task with a deadline");
            Ok(())
        }
    }
}

pub fn print_deleted(mode: OutputMode, id: &TaskId) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        return print_json(&serde_json::json!({ "deleted": id }));
    }
    println!("deleted {id}");
    Ok(())
}

pub fn print_preference(mode: OutputMode, key: &str, value: &str) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        let mut object = serde_json::Map::new();
        object.insert(key.to_string(), serde_json::Value::from(value));
        return print_json(&object);
    }
    println!("{key}: {value}");
    Ok(())
}
