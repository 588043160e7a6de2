//! Derive - 派生ビュー（フィルタ・ソート・集計）
//!
//! すべて純粋関数です。元のコレクションは変更せず、常に新しい `Vec` を返します。
//! TaskStore は書き込みのたびに状態を差し替え、読み出し時にここを呼んで再計算します。
//!
//! # パイプライン
//! 1. status → 2. priority → 3. completed → 4. search → 5. due_date 範囲 → 6. sort

pub mod predicates;
pub mod sort;
pub mod stats;

pub use predicates::{days_until_due, is_overdue, is_task_overdue};
pub use sort::compare_tasks;
pub use stats::{TaskStats, TasksByStatus, completion_rate};

use crate::domain::{Task, TaskFilter, TaskSort};

/// 1 件の Task が filter の全条件を満たすか
pub fn matches_filter(task: &Task, filter: &TaskFilter) -> bool {
    if let Some(status) = filter.status
        && task.status != status
    {
        return false;
    }
    if let Some(priority) = filter.priority
        && task.priority != priority
    {
        return false;
    }
    if let Some(completed) = filter.completed
        && task.completed != completed
    {
        return false;
    }
    if let Some(term) = filter.search_term() {
        let in_title = task.title.to_lowercase().contains(&term);
        let in_description = task
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&term));
        if !in_title && !in_description {
            return false;
        }
    }
    // 範囲指定があるなら期限なしの Task は除外
    if let Some(from) = filter.due_date_from
        && !task.due_date.is_some_and(|due| due >= from)
    {
        return false;
    }
    if let Some(to) = filter.due_date_to
        && !task.due_date.is_some_and(|due| due <= to)
    {
        return false;
    }
    true
}

/// Filtered + sorted copy of `tasks`.
///
/// `sort_by` は stable なので、同じキーの Task は元の並び順を保つ。
pub fn filter_and_sort(tasks: &[Task], filter: &TaskFilter, sort: &TaskSort) -> Vec<Task> {
    let mut view: Vec<Task> = tasks
        .iter()
        .filter(|task| matches_filter(task, filter))
        .cloned()
        .collect();
    view.sort_by(|a, b| compare_tasks(a, b, sort));
    view
}
