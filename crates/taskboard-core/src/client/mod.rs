//! Repository Client - リモートのタスク API を叩く HTTP クライアント
//!
//! # エンドポイント（base_url からの相対）
//! - `GET    /tasks/`                      一覧
//! - `GET    /tasks/{id}/`                 1 件
//! - `POST   /tasks/`                      作成
//! - `PUT    /tasks/{id}/`                 更新（送ったフィールドだけ）
//! - `DELETE /tasks/{id}/`                 削除（本文は読まない）
//! - `GET    /tasks/nearest-deadline/`     最も期限の近い未完了タスク（404 = なし）
//!
//! # エラー変換
//! - 応答なし → `ApiError::Transport`
//! - 設定時間超過 → `ApiError::Timeout`
//! - non-2xx → `ApiError::Request`（本文から message を取り出す）
//! - 2xx だが decode 失敗 → `ApiError::InvalidResponse`

mod body;
mod response;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::domain::{CreateTask, Task, TaskId, UpdateTask};
use crate::error::ApiError;
use crate::ports::TaskGateway;

use self::body::{RequestBody, TaskForm};

/// HttpTaskClient は TaskGateway の本番実装
///
/// キャッシュもリトライもしない。呼び出しごとに 1 リクエスト。
#[derive(Debug, Clone)]
pub struct HttpTaskClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTaskClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let timeout = config.timeout();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                after: self.timeout,
            }
        } else {
            ApiError::Transport {
                message: err.to_string(),
            }
        }
    }

    /// 1 リクエストを送り、2xx の本文（バイト列）を返す
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.url(path);
        debug!(%method, %url, "sending request");

        let mut request = self.http.request(method.clone(), &url);
        request = match body {
            Some(RequestBody::Json(value)) => request.json(&value),
            Some(RequestBody::Multipart(form)) => request.multipart(form),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        if !status.is_success() {
            let err = response::error_from_body(status.as_u16(), &bytes);
            if status != StatusCode::NOT_FOUND {
                warn!(%method, %url, status = status.as_u16(), error = %err, "request failed");
            }
            return Err(err);
        }

        debug!(%method, %url, status = status.as_u16(), len = bytes.len(), "response received");
        Ok(bytes.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<T, ApiError> {
        let bytes = self.send(method, path, body).await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidResponse {
            message: e.to_string(),
        })
    }
}

fn task_path(id: &TaskId) -> String {
    format!("tasks/{id}/")
}

#[async_trait]
impl TaskGateway for HttpTaskClient {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.send_json(Method::GET, "tasks/", None).await
    }

    async fn get_task(&self, id: &TaskId) -> Result<Task, ApiError> {
        self.send_json(Method::GET, &task_path(id), None).await
    }

    async fn create_task(&self, data: &CreateTask) -> Result<Task, ApiError> {
        let body = TaskForm::for_create(data).into_body()?;
        self.send_json(Method::POST, "tasks/", Some(body)).await
    }

    async fn update_task(&self, data: &UpdateTask) -> Result<Task, ApiError> {
        let body = TaskForm::for_update(data).into_body()?;
        self.send_json(Method::PUT, &task_path(&data.id), Some(body))
            .await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), ApiError> {
        self.send(Method::DELETE, &task_path(id), None).await?;
        Ok(())
    }

    async fn nearest_deadline_task(&self) -> Result<Option<Task>, ApiError> {
        match self
            .send_json(Method::GET, "tasks/nearest-deadline/", None)
            .await
        {
            Ok(task) => Ok(Some(task)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
