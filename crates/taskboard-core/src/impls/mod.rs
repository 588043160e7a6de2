//! Impls - 実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryTaskGateway**: HTTP を使わない Gateway（`--demo` とテストで使用）
//! - **InMemoryPreferenceStore**: プロセス内だけの PreferenceStore
//!
//! 本番用の実装は別モジュール：
//! - `client::HttpTaskClient`
//! - `prefs::FilePreferenceStore`

pub mod inmem_gateway;
pub mod inmem_prefs;

pub use self::inmem_gateway::InMemoryTaskGateway;
pub use self::inmem_prefs::InMemoryPreferenceStore;
