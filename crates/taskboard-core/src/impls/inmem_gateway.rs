//! InMemoryTaskGateway - 開発・テスト用の Gateway
//!
//! HTTP を使わずにサーバーの振る舞いを再現します。
//!
//! # できること
//! - 作成時のサーバー既定値（priority = medium, status = todo）と採番
//! - 更新時の `updated_at` 更新、写真アップロードに対する URL 付与
//! - 存在しない id への 404
//! - 障害注入（`fail_next`）と遅延（`with_latency`）
//! - 呼び出し回数の記録（validation がネットワーク前に弾かれたかの確認用）

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use crate::domain::{CreateTask, Task, TaskId, TaskPriority, TaskStatus, UpdateTask};
use crate::error::ApiError;
use crate::ports::{Clock, IdGenerator, SystemClock, TaskGateway, UlidGenerator};

const PHOTO_BASE_URL: &str = "memory://photos";

pub struct InMemoryTaskGateway<C = SystemClock> {
    tasks: Mutex<Vec<Task>>,
    failures: Mutex<VecDeque<ApiError>>,
    latency: Option<Duration>,
    calls: AtomicUsize,
    clock: C,
    ids: UlidGenerator<C>,
}

impl InMemoryTaskGateway<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryTaskGateway<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone> InMemoryTaskGateway<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            latency: None,
            calls: AtomicUsize::new(0),
            ids: UlidGenerator::new(clock.clone()),
            clock,
        }
    }
}

impl<C: Clock> InMemoryTaskGateway<C> {
    /// 初期データを入れる（並びはそのまま「サーバーの返す順」になる）
    pub fn seeded(self, tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..self
        }
    }

    /// 各呼び出しの前に待つ時間
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// 次の呼び出しを `error` で失敗させる（複数回呼べばキューに積まれる）
    pub async fn fail_next(&self, error: ApiError) {
        self.failures.lock().await.push_back(error);
    }

    /// ここまでに受けた呼び出しの数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 現在のサーバー側データ
    pub async fn snapshot(&self) -> Vec<Task> {
        self.tasks.lock().await.clone()
    }

    async fn enter(&self) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.failures.lock().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn not_found(id: &TaskId) -> ApiError {
    ApiError::Request {
        status: 404,
        message: "Not found.".to_owned(),
        payload: json!({ "detail": "Not found.", "id": id.as_str() }),
    }
}

#[async_trait]
impl<C: Clock> TaskGateway for InMemoryTaskGateway<C> {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.enter().await?;
        Ok(self.tasks.lock().await.clone())
    }

    async fn get_task(&self, id: &TaskId) -> Result<Task, ApiError> {
        self.enter().await?;
        let tasks = self.tasks.lock().await;
        tasks
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create_task(&self, data: &CreateTask) -> Result<Task, ApiError> {
        self.enter().await?;
        let now = self.clock.now();
        let id = self.ids.generate_task_id();
        let status = data.status.unwrap_or(TaskStatus::Todo);
        let task = Task {
            photo: data
                .photo
                .as_ref()
                .map(|p| format!("{PHOTO_BASE_URL}/{id}/{}", p.file_name)),
            id,
            title: data.title.clone(),
            description: data.description.clone().filter(|d| !d.is_empty()),
            due_date: data.due_date,
            completed: status == TaskStatus::Done,
            created_at: now,
            updated_at: now,
            status,
            priority: data.priority.unwrap_or(TaskPriority::Medium),
        };
        self.tasks.lock().await.insert(0, task.clone());
        Ok(task)
    }

    async fn update_task(&self, data: &UpdateTask) -> Result<Task, ApiError> {
        self.enter().await?;
        let mut tasks = self.tasks.lock().await;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == data.id)
            .ok_or_else(|| not_found(&data.id))?;

        let mut next = data.apply_to(slot);
        if let Some(photo) = &data.photo {
            next.photo = Some(format!("{PHOTO_BASE_URL}/{}/{}", next.id, photo.file_name));
        }
        next.updated_at = self.clock.now();
        *slot = next.clone();
        Ok(next)
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), ApiError> {
        self.enter().await?;
        let mut tasks = self.tasks.lock().await;
        let before = tasks.len();
        tasks.retain(|t| &t.id != id);
        if tasks.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn nearest_deadline_task(&self) -> Result<Option<Task>, ApiError> {
        self.enter().await?;
        let tasks = self.tasks.lock().await;
        Ok(tasks
            .iter()
            .filter(|t| !t.completed)
            .filter_map(|t| t.due_date.map(|due| (due, t)))
            .min_by_key(|(due, _)| *due)
            .map(|(_, t)| t.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PhotoUpload;
    use crate::ports::FixedClock;
    use crate::testing::{at, sample_tasks};

    fn gateway() -> InMemoryTaskGateway<FixedClock> {
        InMemoryTaskGateway::with_clock(FixedClock::new(at(2024, 6, 1))).seeded(sample_tasks())
    }

    #[tokio::test]
    async fn create_applies_server_defaults_and_prepends() {
        let gw = gateway();
        let created = gw.create_task(&CreateTask::new("New")).await.unwrap();

        assert_eq!(created.priority, TaskPriority::Medium);
        assert_eq!(created.status, TaskStatus::Todo);
        assert!(!created.completed);
        assert_eq!(created.created_at, at(2024, 6, 1));

        let all = gw.list_tasks().await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id, created.id);
    }

    #[tokio::test]
    async fn update_bumps_updated_at_and_assigns_photo_url() {
        let gw = gateway();
        let updated = gw
            .update_task(
                &UpdateTask::new(TaskId::new("2"))
                    .title("Renamed")
                    .photo(PhotoUpload::new("p.png", "image/png", vec![1])),
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.updated_at, at(2024, 6, 1));
        assert_eq!(updated.photo.as_deref(), Some("memory://photos/2/p.png"));
    }

    #[tokio::test]
    async fn unknown_ids_are_404() {
        let gw = gateway();
        let missing = TaskId::new("nope");
        assert!(gw.get_task(&missing).await.unwrap_err().is_not_found());
        assert!(gw.delete_task(&missing).await.unwrap_err().is_not_found());
        assert!(
            gw.update_task(&UpdateTask::new(missing))
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn nearest_deadline_skips_completed_and_undated() {
        let gw = gateway();
        let nearest = gw.nearest_deadline_task().await.unwrap();
        assert_eq!(nearest.map(|t| t.id), Some(TaskId::new("1")));

        let empty = InMemoryTaskGateway::new();
        assert_eq!(empty.nearest_deadline_task().await.unwrap(), None);
    }

    #[tokio::test]
    async fn injected_failure_is_returned_once() {
        let gw = gateway();
        gw.fail_next(ApiError::Transport {
            message: "offline".into(),
        })
        .await;

        assert!(matches!(
            gw.list_tasks().await,
            Err(ApiError::Transport { .. })
        ));
        assert_eq!(gw.list_tasks().await.unwrap().len(), 3);
        assert_eq!(gw.calls(), 2);
    }
}
