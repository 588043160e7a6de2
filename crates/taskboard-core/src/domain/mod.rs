//! Domain model (task record, payloads, criteria, validation).
//!
//! - **ids**: TaskId（サーバー採番の opaque な文字列）
//! - **task**: Task / TaskStatus / TaskPriority
//! - **payload**: CreateTask / UpdateTask / PhotoUpload
//! - **criteria**: TaskFilter / TaskSort / ViewMode
//! - **validation**: 送信前の入力検証
//! - **errors**: フィールド単位の検証エラー

pub mod criteria;
pub mod errors;
pub mod ids;
pub mod payload;
pub mod task;
pub mod validation;

pub use criteria::{FilterPatch, SortDirection, SortField, TaskFilter, TaskSort, ViewKind, ViewMode};
pub use errors::{FieldError, ValidationErrors};
pub use ids::TaskId;
pub use payload::{CreateTask, PhotoUpload, UpdateTask};
pub use task::{Task, TaskPriority, TaskStatus};
pub use validation::{parse_due_date, validate_create, validate_photo, validate_update};
