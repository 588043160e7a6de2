//! Task Store - タスク一覧のキャッシュ + 派生ビュー + 楽観的更新
//!
//! # 状態
//! 状態は `tokio::sync::watch` の 1 セルに入っている。
//! 書き込みは `send_modify` 1 回で行い、購読者（`subscribe()`）に通知される。
//! 派生ビュー（filtered_and_sorted / stats / tasks_by_status）は読むたびに計算する。
//!
//! # コマンドのプロトコル
//! Optimistic Apply → Remote Call → Reconcile or Rollback
//!
//! | コマンド | loading | 開始時に error を消す | 楽観的更新 |
//! |---|---|---|---|
//! | load_tasks | する | する | - |
//! | create_task | する | する | -（サーバー応答を先頭に追加） |
//! | update_task | しない | しない | する |
//! | delete_task | しない | しない | する |
//!
//! 失敗はすべて `error` スロットに user message を入れ、ログを出し、呼び出し元に返す。

pub mod optimistic;
pub mod state;

pub use self::optimistic::{prepend, remove_by_key, replace_by_key};
pub use self::state::StoreState;

use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::derive::{TaskStats, TasksByStatus};
use crate::domain::{
    CreateTask, FilterPatch, Task, TaskFilter, TaskId, TaskSort, TaskStatus, UpdateTask, ViewMode,
    validate_create, validate_update,
};
use crate::error::ApiError;
use crate::ports::{Clock, SystemClock, TaskGateway};

fn task_key(task: &Task) -> &TaskId {
    &task.id
}

/// TaskStore は Gateway の前に立つクライアント側のストア
///
/// グローバルには置かない。必要なところへ明示的に渡す。
pub struct TaskStore<G, C = SystemClock> {
    gateway: G,
    clock: C,
    state: watch::Sender<StoreState>,
}

impl<G: TaskGateway> TaskStore<G, SystemClock> {
    pub fn new(gateway: G) -> Self {
        Self::with_clock(gateway, SystemClock)
    }
}

impl<G: TaskGateway, C: Clock> TaskStore<G, C> {
    pub fn with_clock(gateway: G, clock: C) -> Self {
        Self {
            gateway,
            clock,
            state: watch::Sender::new(StoreState::default()),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // ------------------------------------------------------------------
    // 読み出し
    // ------------------------------------------------------------------

    /// 状態の変化を受け取る receiver（現在値は既読扱い）
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.borrow().tasks.clone()
    }

    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.state.borrow().find(id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn filter(&self) -> TaskFilter {
        self.state.borrow().filter.clone()
    }

    pub fn sort(&self) -> TaskSort {
        self.state.borrow().sort
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state.borrow().view_mode
    }

    pub fn filtered_and_sorted(&self) -> Vec<Task> {
        self.state.borrow().filtered_and_sorted()
    }

    pub fn stats(&self) -> TaskStats {
        let now = self.clock.now();
        self.state.borrow().stats(now)
    }

    pub fn tasks_by_status(&self) -> TasksByStatus {
        self.state.borrow().tasks_by_status()
    }

    // ------------------------------------------------------------------
    // リモートを伴うコマンド
    // ------------------------------------------------------------------

    /// 全件を取り直してコレクションを置き換える
    ///
    /// 失敗時はコレクションを残したまま error をセットする。
    pub async fn load_tasks(&self) -> Result<(), ApiError> {
        self.begin_loading();
        match self.gateway.list_tasks().await {
            Ok(tasks) => {
                debug!(count = tasks.len(), "tasks loaded");
                self.write(|s| {
                    s.tasks = tasks;
                    s.loading = false;
                });
                Ok(())
            }
            Err(e) => {
                self.record_failure("load tasks", &e, |s| s.loading = false);
                Err(e)
            }
        }
    }

    /// 作成してサーバーの返した Task を先頭に追加する
    pub async fn create_task(&self, data: &CreateTask) -> Result<Task, ApiError> {
        if let Err(errors) = validate_create(data) {
            let e = ApiError::from(errors);
            self.record_failure("create task", &e, |_| {});
            return Err(e);
        }

        self.begin_loading();
        match self.gateway.create_task(data).await {
            Ok(task) => {
                debug!(id = %task.id, "task created");
                self.write(|s| {
                    prepend(&mut s.tasks, task.clone());
                    s.loading = false;
                });
                Ok(task)
            }
            Err(e) => {
                self.record_failure("create task", &e, |s| s.loading = false);
                Err(e)
            }
        }
    }

    /// 楽観的に反映してから送信し、失敗したら送信前のコレクションに戻す
    pub async fn update_task(&self, data: &UpdateTask) -> Result<Task, ApiError> {
        if let Err(errors) = validate_update(data) {
            let e = ApiError::from(errors);
            self.record_failure("update task", &e, |_| {});
            return Err(e);
        }

        let snapshot = self.apply_optimistic(|tasks| {
            replace_by_key(tasks, &data.id, task_key, |task| data.apply_to(task));
        });

        match self.gateway.update_task(data).await {
            Ok(task) => {
                debug!(id = %task.id, "task updated");
                self.write(|s| {
                    replace_by_key(&mut s.tasks, &data.id, task_key, |_| task.clone());
                });
                Ok(task)
            }
            Err(e) => {
                warn!(id = %data.id, "rolling back optimistic update");
                self.record_failure("update task", &e, |s| s.tasks = snapshot);
                Err(e)
            }
        }
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<(), ApiError> {
        let snapshot = self.apply_optimistic(|tasks| {
            remove_by_key(tasks, id, task_key);
        });

        match self.gateway.delete_task(id).await {
            Ok(()) => {
                debug!(%id, "task deleted");
                Ok(())
            }
            Err(e) => {
                warn!(%id, "rolling back optimistic delete");
                self.record_failure("delete task", &e, |s| s.tasks = snapshot);
                Err(e)
            }
        }
    }

    /// 完了状態を反転する（status も done / todo に揃える）
    ///
    /// ストアに無い id なら何もせず `Ok(None)`。
    pub async fn toggle_task_completion(&self, id: &TaskId) -> Result<Option<Task>, ApiError> {
        let Some(completed) = self.task(id).map(|t| !t.completed) else {
            debug!(%id, "toggle ignored for unknown task");
            return Ok(None);
        };
        let status = if completed {
            TaskStatus::Done
        } else {
            TaskStatus::Todo
        };
        let update = UpdateTask::new(id.clone())
            .completed(completed)
            .status(status);
        self.update_task(&update).await.map(Some)
    }

    pub async fn change_task_status(
        &self,
        id: &TaskId,
        status: TaskStatus,
    ) -> Result<Task, ApiError> {
        let update = UpdateTask::new(id.clone())
            .status(status)
            .completed(status == TaskStatus::Done);
        self.update_task(&update).await
    }

    /// Gateway にそのまま問い合わせる（ストアの状態には触れない）
    pub async fn nearest_deadline_task(&self) -> Result<Option<Task>, ApiError> {
        self.gateway.nearest_deadline_task().await
    }

    // ------------------------------------------------------------------
    // ビュー条件（同期）
    // ------------------------------------------------------------------

    pub fn set_filter(&self, patch: FilterPatch) {
        self.write(|s| s.filter.merge(patch));
    }

    pub fn clear_filter(&self) {
        self.write(|s| s.filter = TaskFilter::default());
    }

    pub fn set_sort(&self, sort: TaskSort) {
        self.write(|s| s.sort = sort);
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.write(|s| s.view_mode = mode);
    }

    pub fn clear_error(&self) {
        self.write(|s| s.error = None);
    }

    // ------------------------------------------------------------------
    // 内部
    // ------------------------------------------------------------------

    fn write(&self, f: impl FnOnce(&mut StoreState)) {
        self.state.send_modify(f);
    }

    fn begin_loading(&self) {
        self.write(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    /// スナップショットを取り、同じ書き込みの中で楽観的な変更を適用する
    fn apply_optimistic(&self, f: impl FnOnce(&mut Vec<Task>)) -> Vec<Task> {
        let mut snapshot = Vec::new();
        self.write(|s| {
            snapshot = s.tasks.clone();
            f(&mut s.tasks);
        });
        snapshot
    }

    fn record_failure(&self, action: &str, e: &ApiError, f: impl FnOnce(&mut StoreState)) {
        error!(action, status = e.status(), error = %e, "task command failed");
        let message = e.user_message();
        self.write(|s| {
            f(s);
            s.error = Some(message);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PhotoUpload, SortDirection, SortField, TaskPriority, ViewKind};
    use crate::impls::InMemoryTaskGateway;
    use crate::ports::FixedClock;
    use crate::testing::{at, sample_tasks};
    use std::sync::Arc;
    use std::time::Duration;

    type Store = TaskStore<Arc<InMemoryTaskGateway<FixedClock>>, FixedClock>;

    fn server() -> Arc<InMemoryTaskGateway<FixedClock>> {
        Arc::new(
            InMemoryTaskGateway::with_clock(FixedClock::new(at(2024, 6, 1)))
                .seeded(sample_tasks()),
        )
    }

    fn store_over(gateway: Arc<InMemoryTaskGateway<FixedClock>>) -> Store {
        TaskStore::with_clock(gateway, FixedClock::new(at(2024, 6, 1)))
    }

    async fn loaded_store() -> (Store, Arc<InMemoryTaskGateway<FixedClock>>) {
        let gateway = server();
        let store = store_over(gateway.clone());
        store.load_tasks().await.unwrap();
        (store, gateway)
    }

    fn server_error(status: u16) -> ApiError {
        ApiError::Request {
            status,
            message: "Server exploded".to_string(),
            payload: serde_json::json!({"message": "Server exploded"}),
        }
    }

    #[tokio::test]
    async fn store_starts_empty() {
        let store = store_over(server());
        let state = store.snapshot();
        assert!(state.tasks.is_empty());
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.sort, TaskSort::default());
    }

    #[tokio::test]
    async fn load_replaces_collection_and_resets_loading() {
        let (store, _) = loaded_store().await;
        assert_eq!(store.tasks().len(), 3);
        assert!(!store.is_loading());
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn load_sets_loading_while_in_flight() {
        let gateway = Arc::new(
            InMemoryTaskGateway::with_clock(FixedClock::new(at(2024, 6, 1)))
                .seeded(sample_tasks())
                .with_latency(Duration::from_millis(50)),
        );
        let store = store_over(gateway);
        let mut rx = store.subscribe();

        let probe = async {
            rx.changed().await.unwrap();
            rx.borrow_and_update().loading
        };
        let (result, loading_seen) = tokio::join!(store.load_tasks(), probe);

        result.unwrap();
        assert!(loading_seen);
        assert!(!store.is_loading());
    }

    /// コマンド実行中に publish された各状態の loading を集める（最後の状態を含む）
    async fn loading_during<F: std::future::Future>(
        rx: &mut watch::Receiver<StoreState>,
        command: F,
    ) -> (F::Output, Vec<bool>) {
        tokio::pin!(command);
        let mut seen = Vec::new();
        let output = loop {
            tokio::select! {
                biased;
                changed = rx.changed() => {
                    changed.unwrap();
                    seen.push(rx.borrow_and_update().loading);
                }
                output = &mut command => break output,
            }
        };
        seen.push(rx.borrow_and_update().loading);
        (output, seen)
    }

    fn slow_store() -> Store {
        let gateway = Arc::new(
            InMemoryTaskGateway::with_clock(FixedClock::new(at(2024, 6, 1)))
                .seeded(sample_tasks())
                .with_latency(Duration::from_millis(50)),
        );
        store_over(gateway)
    }

    #[tokio::test]
    async fn create_sets_loading_while_in_flight() {
        let store = slow_store();
        let mut rx = store.subscribe();

        let (result, seen) =
            loading_during(&mut rx, store.create_task(&CreateTask::new("Slow"))).await;

        result.unwrap();
        assert!(seen.contains(&true), "seen = {seen:?}");
        assert_eq!(seen.last(), Some(&false));
    }

    #[tokio::test]
    async fn update_and_delete_never_touch_loading() {
        let store = slow_store();
        store.load_tasks().await.unwrap();
        let mut rx = store.subscribe();

        let update = UpdateTask::new(TaskId::new("1")).title("Renamed");
        let (result, seen) = loading_during(&mut rx, store.update_task(&update)).await;
        result.unwrap();
        // optimistic apply + reconcile
        assert!(seen.len() >= 2, "seen = {seen:?}");
        assert!(seen.iter().all(|loading| !loading), "seen = {seen:?}");

        let (result, seen) = loading_during(&mut rx, store.delete_task(&TaskId::new("2"))).await;
        result.unwrap();
        assert!(seen.iter().all(|loading| !loading), "seen = {seen:?}");
    }

    #[tokio::test]
    async fn load_failure_keeps_collection_and_reports() {
        let (store, gateway) = loaded_store().await;
        gateway.fail_next(server_error(500)).await;

        let err = store.load_tasks().await.unwrap_err();

        assert_eq!(err.status(), 500);
        assert_eq!(store.tasks().len(), 3);
        assert_eq!(store.error().as_deref(), Some("Server exploded"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn create_prepends_server_task() {
        let (store, _) = loaded_store().await;
        let created = store
            .create_task(&CreateTask::new("Fresh").priority(TaskPriority::High))
            .await
            .unwrap();

        let tasks = store.tasks();
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0], created);
        assert_eq!(created.status, TaskStatus::Todo);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn create_failure_leaves_collection() {
        let (store, gateway) = loaded_store().await;
        let before = store.tasks();
        gateway
            .fail_next(ApiError::Timeout {
                after: Duration::from_secs(10),
            })
            .await;

        let err = store.create_task(&CreateTask::new("Nope")).await.unwrap_err();

        assert!(matches!(err, ApiError::Timeout { .. }));
        assert_eq!(store.tasks(), before);
        assert_eq!(store.error().as_deref(), Some("Request timeout"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_gateway() {
        let (store, gateway) = loaded_store().await;
        let calls = gateway.calls();

        let err = store.create_task(&CreateTask::new("")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = store
            .update_task(&UpdateTask::new(TaskId::new("1")).title("x".repeat(101)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        assert_eq!(gateway.calls(), calls);
        assert_eq!(
            store.error().as_deref(),
            Some("title: Title must be 100 characters or less")
        );
    }

    #[tokio::test]
    async fn update_reconciles_with_server_task() {
        let (store, _) = loaded_store().await;
        let updated = store
            .update_task(&UpdateTask::new(TaskId::new("2")).title("Renamed"))
            .await
            .unwrap();

        assert_eq!(updated.updated_at, at(2024, 6, 1));
        assert_eq!(store.task(&TaskId::new("2")), Some(updated));
        // 位置は変わらない
        assert_eq!(store.tasks()[1].id, TaskId::new("2"));
    }

    #[tokio::test]
    async fn failed_update_restores_the_exact_snapshot() {
        let (store, gateway) = loaded_store().await;
        let before = store.tasks();
        gateway.fail_next(server_error(500)).await;

        let result = store
            .update_task(
                &UpdateTask::new(TaskId::new("1"))
                    .title("Changed")
                    .priority(TaskPriority::Low)
                    .clear_due_date(),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(store.tasks(), before);
        assert!(store.error().is_some());
    }

    #[tokio::test]
    async fn failed_delete_restores_the_exact_snapshot() {
        let (store, gateway) = loaded_store().await;
        let before = store.tasks();
        gateway.fail_next(server_error(503)).await;

        assert!(store.delete_task(&TaskId::new("2")).await.is_err());
        assert_eq!(store.tasks(), before);
        assert_eq!(store.error().as_deref(), Some("Server exploded"));
    }

    #[tokio::test]
    async fn delete_removes_task() {
        let (store, gateway) = loaded_store().await;
        store.delete_task(&TaskId::new("2")).await.unwrap();

        assert!(store.task(&TaskId::new("2")).is_none());
        assert_eq!(gateway.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn optimistic_state_is_visible_before_the_response() {
        let gateway = Arc::new(
            InMemoryTaskGateway::with_clock(FixedClock::new(at(2024, 6, 1)))
                .seeded(sample_tasks())
                .with_latency(Duration::from_millis(50)),
        );
        let store = store_over(gateway.clone());
        store.load_tasks().await.unwrap();
        gateway.fail_next(server_error(500)).await;
        let before = store.tasks();

        let mut rx = store.subscribe();
        let probe = async {
            rx.changed().await.unwrap();
            rx.borrow_and_update().find(&TaskId::new("1")).cloned()
        };
        let update = UpdateTask::new(TaskId::new("1")).title("Optimistic");
        let (result, optimistic) = tokio::join!(store.update_task(&update), probe);

        assert_eq!(optimistic.map(|t| t.title), Some("Optimistic".to_string()));
        assert!(result.is_err());
        assert_eq!(store.tasks(), before);
    }

    #[tokio::test]
    async fn pending_photo_never_replaces_the_visible_url() {
        let mut seeded = sample_tasks();
        seeded[0].photo = Some("https://cdn.example.com/old.png".to_string());
        let gateway = Arc::new(
            InMemoryTaskGateway::with_clock(FixedClock::new(at(2024, 6, 1)))
                .seeded(seeded)
                .with_latency(Duration::from_millis(50)),
        );
        let store = store_over(gateway);
        store.load_tasks().await.unwrap();

        let mut rx = store.subscribe();
        let probe = async {
            rx.changed().await.unwrap();
            rx.borrow_and_update()
                .find(&TaskId::new("1"))
                .and_then(|t| t.photo.clone())
        };
        let update = UpdateTask::new(TaskId::new("1"))
            .photo(PhotoUpload::new("new.png", "image/png", vec![0u8; 8]));
        let (result, photo_in_flight) = tokio::join!(store.update_task(&update), probe);

        assert_eq!(
            photo_in_flight.as_deref(),
            Some("https://cdn.example.com/old.png")
        );
        let updated = result.unwrap();
        assert_eq!(updated.photo.as_deref(), Some("memory://photos/1/new.png"));
        assert_eq!(store.task(&TaskId::new("1")).and_then(|t| t.photo), updated.photo);
    }

    #[tokio::test]
    async fn update_does_not_clear_previous_error() {
        let (store, gateway) = loaded_store().await;
        gateway.fail_next(server_error(500)).await;
        let _ = store.delete_task(&TaskId::new("3")).await;

        store
            .update_task(&UpdateTask::new(TaskId::new("2")).title("ok"))
            .await
            .unwrap();
        assert_eq!(store.error().as_deref(), Some("Server exploded"));

        store.clear_error();
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn toggle_flips_completed_and_status() {
        let (store, _) = loaded_store().await;

        let done = store
            .toggle_task_completion(&TaskId::new("1"))
            .await
            .unwrap()
            .unwrap();
        assert!(done.completed);
        assert_eq!(done.status, TaskStatus::Done);

        let reopened = store
            .toggle_task_completion(&TaskId::new("1"))
            .await
            .unwrap()
            .unwrap();
        assert!(!reopened.completed);
        assert_eq!(reopened.status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn toggle_unknown_task_is_a_noop() {
        let (store, gateway) = loaded_store().await;
        let calls = gateway.calls();
        let before = store.snapshot();

        let result = store.toggle_task_completion(&TaskId::new("404")).await;

        assert!(matches!(result, Ok(None)));
        assert_eq!(gateway.calls(), calls);
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn change_status_keeps_completed_in_sync() {
        let (store, _) = loaded_store().await;

        let task = store
            .change_task_status(&TaskId::new("2"), TaskStatus::Done)
            .await
            .unwrap();
        assert!(task.completed);

        let task = store
            .change_task_status(&TaskId::new("3"), TaskStatus::InProgress)
            .await
            .unwrap();
        assert!(!task.completed);
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn nearest_deadline_passes_through() {
        let (store, _) = loaded_store().await;
        let before = store.snapshot();

        let nearest = store.nearest_deadline_task().await.unwrap();

        assert_eq!(nearest.map(|t| t.id), Some(TaskId::new("1")));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn criteria_writes_notify_subscribers() {
        let (store, _) = loaded_store().await;
        let mut rx = store.subscribe();

        store.set_filter(FilterPatch::new().status(Some(TaskStatus::Todo)));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().filter.status, Some(TaskStatus::Todo));

        store.set_view_mode(ViewMode {
            kind: ViewKind::Kanban,
            compact: true,
        });
        assert_eq!(store.view_mode().kind, ViewKind::Kanban);

        store.clear_filter();
        assert!(store.filter().is_empty());
    }

    #[tokio::test]
    async fn end_to_end_filter_and_priority_sort() {
        let (store, _) = loaded_store().await;

        store.set_filter(FilterPatch::new().completed(Some(true)));
        let done = store.filtered_and_sorted();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].status, TaskStatus::Done);

        store.clear_filter();
        store.set_sort(TaskSort::new(SortField::Priority, SortDirection::Desc));
        let priorities: Vec<_> = store
            .filtered_and_sorted()
            .into_iter()
            .map(|t| t.priority)
            .collect();
        assert_eq!(
            priorities,
            [TaskPriority::High, TaskPriority::Medium, TaskPriority::Low]
        );
    }

    #[tokio::test]
    async fn stats_use_the_injected_clock() {
        let gateway = server();
        let store = TaskStore::with_clock(gateway, FixedClock::new(at(2025, 1, 1)));
        store.load_tasks().await.unwrap();

        let stats = store.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.completion_rate, 33);

        let grouped = store.tasks_by_status();
        assert_eq!(grouped.todo.len(), 1);
        assert_eq!(grouped.in_progress.len(), 1);
        assert_eq!(grouped.done.len(), 1);
    }
}
