//! taskboard-core
//!
//! Client-side core of the taskboard: a typed client for the remote task API,
//! a reactive task store with derived views, and optimistic updates.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Task, payload, filter/sort, validation）
//! - **ports**: 抽象化レイヤー（TaskGateway, Clock, IdGenerator, PreferenceStore）
//! - **client**: TaskGateway の HTTP 実装（reqwest）
//! - **impls**: 開発・テスト用の実装（InMemoryTaskGateway など）
//! - **store**: TaskStore（watch セル + 楽観的更新 / ロールバック）
//! - **derive**: 派生ビュー（フィルタ・ソート・集計）の純粋関数
//! - **prefs**: テーマ / ロケールの永続化
//! - **config**: API の接続先などの設定
//! - **error**: ApiError

pub mod client;
pub mod config;
pub mod derive;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;
pub mod prefs;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use client::HttpTaskClient;
pub use config::{ApiConfig, AppConfig, ConfigError};
pub use domain::{
    CreateTask, FilterPatch, PhotoUpload, SortDirection, SortField, Task, TaskFilter, TaskId,
    TaskPriority, TaskSort, TaskStatus, UpdateTask, ViewKind, ViewMode,
};
pub use error::ApiError;
pub use store::{StoreState, TaskStore};
