//! Command payloads (create / update) sent to the Gateway.

use chrono::{DateTime, Utc};
use std::fmt;

use super::ids::TaskId;
use super::task::{Task, TaskPriority, TaskStatus};

/// PhotoUpload はアップロード待ちの画像ファイル
///
/// サーバーに送るまで URL は存在しない。
/// そのため楽観的更新では既存の `Task::photo`（URL）を上書きしない。
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

// bytes は巨大になり得るのでサイズだけ出す
impl fmt::Debug for PhotoUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoUpload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Payload for creating a task.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub photo: Option<PhotoUpload>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
}

impl CreateTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn photo(mut self, photo: PhotoUpload) -> Self {
        self.photo = Some(photo);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Partial update of an existing task.
///
/// `None` のフィールドは変更しない。
/// `due_date` だけは二重 Option で「クリア」（`Some(None)`）を表現する。
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTask {
    pub id: TaskId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub photo: Option<PhotoUpload>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub completed: Option<bool>,
}

impl UpdateTask {
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            title: None,
            description: None,
            due_date: None,
            photo: None,
            priority: None,
            status: None,
            completed: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(Some(due_date));
        self
    }

    pub fn clear_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    pub fn photo(mut self, photo: PhotoUpload) -> Self {
        self.photo = Some(photo);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// 楽観的更新: 指定されたフィールドだけをローカルの Task に反映する
    ///
    /// - `photo` は反映しない（URL はサーバー応答でのみ置き換わる）
    /// - `updated_at` もサーバーの値を待つ
    pub fn apply_to(&self, task: &Task) -> Task {
        let mut next = task.clone();
        if let Some(title) = &self.title {
            next.title = title.clone();
        }
        if let Some(description) = &self.description {
            next.description = Some(description.clone());
        }
        if let Some(due_date) = self.due_date {
            next.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(completed) = self.completed {
            next.completed = completed;
        }
        next
    }
}
