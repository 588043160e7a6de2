//! StoreState - TaskStore が watch で配る状態の値

use chrono::{DateTime, Utc};

use crate::derive::{TaskStats, TasksByStatus, filter_and_sort};
use crate::domain::{Task, TaskFilter, TaskId, TaskSort, ViewMode};

/// StoreState はある時点のストア全体
///
/// 書き込みはすべて 1 回の置き換えとして行われるので、
/// 受け取った値の中では tasks と criteria が常に整合している。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreState {
    pub tasks: Vec<Task>,
    pub loading: bool,
    /// 最後に失敗したコマンドのメッセージ（last-error-wins）
    pub error: Option<String>,
    pub filter: TaskFilter,
    pub sort: TaskSort,
    pub view_mode: ViewMode,
}

impl StoreState {
    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn filtered_and_sorted(&self) -> Vec<Task> {
        filter_and_sort(&self.tasks, &self.filter, &self.sort)
    }

    /// フィルタ前の全件から集計する
    pub fn stats(&self, now: DateTime<Utc>) -> TaskStats {
        TaskStats::compute(&self.tasks, now)
    }

    pub fn tasks_by_status(&self) -> TasksByStatus {
        TasksByStatus::group(&self.tasks)
    }
}
