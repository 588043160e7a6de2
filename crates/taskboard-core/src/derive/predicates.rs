//! Date predicates used by the derived views.

use chrono::{DateTime, Utc};

use crate::domain::Task;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// 期限が `now` より厳密に前なら true
pub fn is_overdue(due: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    due < now
}

/// Task の overdue: 期限切れ かつ 未完了
pub fn is_task_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    !task.completed && task.due_date.is_some_and(|due| is_overdue(due, now))
}

/// 期限までの日数（切り上げ）。過ぎていれば負になる
pub fn days_until_due(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff = (due - now).num_milliseconds();
    // ceil for both signs
    diff.div_euclid(MILLIS_PER_DAY) + i64::from(diff.rem_euclid(MILLIS_PER_DAY) != 0)
}

/// Sort key for due dates: absent sorts as epoch 0.
pub(crate) fn due_date_key(task: &Task) -> i64 {
    task.due_date.map(|d| d.timestamp_millis()).unwrap_or(0)
}
