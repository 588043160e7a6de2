//! Filter / sort criteria and view mode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::FieldError;
use super::task::{TaskPriority, TaskStatus};

/// TaskFilter は派生ビューの絞り込み条件
///
/// すべて optional。`None` は「制約なし」を意味し、
/// 有効な条件同士は AND で合成される。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date_to: Option<DateTime<Utc>>,
}

impl TaskFilter {
    /// Search term after trimming and case folding. Blank terms are inactive.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
            && self.search_term().is_none()
            && self.due_date_from.is_none()
            && self.due_date_to.is_none()
    }

    /// 部分更新をマージする（指定されたフィールドだけ上書き）
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(search) = patch.search {
            self.search = search;
        }
        if let Some(from) = patch.due_date_from {
            self.due_date_from = from;
        }
        if let Some(to) = patch.due_date_to {
            self.due_date_to = to;
        }
    }
}

/// FilterPatch は TaskFilter の部分更新
///
/// 外側の `None` = 変更しない、`Some(None)` = その条件を外す。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterPatch {
    pub status: Option<Option<TaskStatus>>,
    pub priority: Option<Option<TaskPriority>>,
    pub completed: Option<Option<bool>>,
    pub search: Option<Option<String>>,
    pub due_date_from: Option<Option<DateTime<Utc>>>,
    pub due_date_to: Option<Option<DateTime<Utc>>>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: Option<TaskStatus>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: Option<TaskPriority>) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn completed(mut self, completed: Option<bool>) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn search(mut self, search: Option<String>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn due_date_from(mut self, from: Option<DateTime<Utc>>) -> Self {
        self.due_date_from = Some(from);
        self
    }

    pub fn due_date_to(mut self, to: Option<DateTime<Utc>>) -> Self {
        self.due_date_to = Some(to);
        self
    }
}

/// Sortable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    #[default]
    CreatedAt,
    UpdatedAt,
    DueDate,
    Priority,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::DueDate => "due_date",
            SortField::Priority => "priority",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortField::Title),
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            "due_date" => Ok(SortField::DueDate),
            "priority" => Ok(SortField::Priority),
            other => Err(FieldError::new("sort", format!("unknown sort field '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// TaskSort は常に 1 つだけ有効なソート条件
///
/// デフォルトは `created_at desc`（新しい順）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl TaskSort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Presentation-only layout selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    #[default]
    List,
    Kanban,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewMode {
    #[serde(rename = "type")]
    pub kind: ViewKind,
    #[serde(default)]
    pub compact: bool,
}
