//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（タスク API、時刻、永続化ストレージ）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - Gateway（リモート API）が source of truth（正本）
//! - TaskStore はそのキャッシュ + 派生ビュー

pub mod clock;
pub mod gateway;
pub mod id_generator;
pub mod preference_store;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::gateway::TaskGateway;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::preference_store::{PreferenceStore, PrefsError};
