use std::time::Duration;

use thiserror::Error;

use crate::domain::ValidationErrors;

/// ApiError は Repository Client と TaskStore が返すエラー分類
///
/// - Validation: ネットワーク呼び出し前に弾いた入力
/// - Transport: 応答そのものが無い（DNS / 接続拒否 / オフライン）
/// - Timeout: 設定時間を超えたので中断した
/// - Request: サーバーが non-2xx を返した（404 は `is_not_found()`）
/// - InvalidResponse: 2xx だが本文を期待した型に decode できない
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("network error: {message}")]
    Transport { message: String },

    #[error("request timed out after {}ms", after.as_millis())]
    Timeout { after: Duration },

    #[error("request failed with status {status}: {message}")]
    Request {
        status: u16,
        message: String,
        payload: serde_json::Value,
    },

    #[error("invalid response: {message}")]
    InvalidResponse { message: String },
}

impl ApiError {
    /// HTTP 風のステータス（応答なしは 0、timeout は 408）
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 422,
            ApiError::Transport { .. } | ApiError::InvalidResponse { .. } => 0,
            ApiError::Timeout { .. } => 408,
            ApiError::Request { status, .. } => *status,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Request { status: 404, .. })
    }

    /// Message shown to the user in the store's error slot.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(errors) => errors.to_string(),
            ApiError::Transport { .. } => "Network error occurred".to_string(),
            ApiError::Timeout { .. } => "Request timeout".to_string(),
            ApiError::Request { message, .. } => message.clone(),
            ApiError::InvalidResponse { .. } => "Unexpected response from server".to_string(),
        }
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            ApiError::Request { payload, .. } => Some(payload),
            _ => None,
        }
    }
}
