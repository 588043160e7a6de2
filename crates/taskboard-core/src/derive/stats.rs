//! Aggregate statistics and the status-grouped view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Task, TaskStatus};

use super::predicates::is_task_overdue;

/// TaskStats は全件（フィルタ前）からの集計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    /// 0〜100 の整数（四捨五入）。total == 0 のときは 0
    pub completion_rate: u32,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let overdue = tasks.iter().filter(|t| is_task_overdue(t, now)).count();
        Self {
            total,
            completed,
            pending: total - completed,
            overdue,
            completion_rate: completion_rate(completed, total),
        }
    }
}

/// round-half-up(completed / total * 100)
///
/// 整数演算: (200 * completed + total) / (2 * total)
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let rate = (200 * completed as u64 + total as u64) / (2 * total as u64);
    rate as u32
}

/// TasksByStatus は status ごとのバケット（kanban 用）
///
/// 各バケット内の順序は元のコレクションの順序を保つ。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TasksByStatus {
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub done: Vec<Task>,
}

impl TasksByStatus {
    pub fn group(tasks: &[Task]) -> Self {
        let mut grouped = Self::default();
        for task in tasks {
            grouped.bucket_mut(task.status).push(task.clone());
        }
        grouped
    }

    pub fn bucket(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    fn bucket_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Done => &mut self.done,
        }
    }
}
