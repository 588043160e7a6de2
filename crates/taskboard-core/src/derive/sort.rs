//! Comparator for the sorted view.

use std::cmp::Ordering;

use crate::domain::{SortDirection, SortField, Task, TaskSort};

use super::predicates::due_date_key;

/// sort 条件に従って 2 つの Task を比較する
///
/// - title: 大文字小文字を無視した辞書順
/// - created_at / updated_at: タイムスタンプ
/// - due_date: タイムスタンプ（期限なしは epoch 0 = 最も早い）
/// - priority: low < medium < high
///
/// 同値の場合は `Ordering::Equal`（二次キーなし）。
pub fn compare_tasks(a: &Task, b: &Task, sort: &TaskSort) -> Ordering {
    let ordering = match sort.field {
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::DueDate => due_date_key(a).cmp(&due_date_key(b)),
        SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
    };
    match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}
