//! TaskGateway port - リモートのタスク API（source of truth）
//!
//! TaskStore はこの trait にだけ依存します。
//!
//! # 実装
//! - `client::HttpTaskClient`: 本番用（HTTP）
//! - `impls::InMemoryTaskGateway`: 開発・テスト用

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{CreateTask, Task, TaskId, UpdateTask};
use crate::error::ApiError;

/// TaskGateway は Gateway の CRUD 契約
///
/// # 設計原則
/// - エラーは握りつぶさず、必ず `ApiError` のいずれかに変換して返す
/// - キャッシュしない（キャッシュは TaskStore の責務）
/// - `nearest_deadline_task` だけは 404 を「該当なし」（`Ok(None)`）として扱う
#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;

    async fn get_task(&self, id: &TaskId) -> Result<Task, ApiError>;

    async fn create_task(&self, data: &CreateTask) -> Result<Task, ApiError>;

    async fn update_task(&self, data: &UpdateTask) -> Result<Task, ApiError>;

    async fn delete_task(&self, id: &TaskId) -> Result<(), ApiError>;

    async fn nearest_deadline_task(&self) -> Result<Option<Task>, ApiError>;
}

#[async_trait]
impl<T: TaskGateway + ?Sized> TaskGateway for Arc<T> {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        (**self).list_tasks().await
    }

    async fn get_task(&self, id: &TaskId) -> Result<Task, ApiError> {
        (**self).get_task(id).await
    }

    async fn create_task(&self, data: &CreateTask) -> Result<Task, ApiError> {
        (**self).create_task(data).await
    }

    async fn update_task(&self, data: &UpdateTask) -> Result<Task, ApiError> {
        (**self).update_task(data).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), ApiError> {
        (**self).delete_task(id).await
    }

    async fn nearest_deadline_task(&self) -> Result<Option<Task>, ApiError> {
        (**self).nearest_deadline_task().await
    }
}
