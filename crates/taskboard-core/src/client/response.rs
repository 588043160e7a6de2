//! Non-2xx response handling.

use serde_json::Value;

use crate::error::ApiError;

const UNKNOWN_ERROR: &str = "Unknown error";
const MESSAGE_KEYS: [&str; 3] = ["message", "detail", "error"];

/// non-2xx の本文から `ApiError::Request` を作る
///
/// message の優先順位:
/// 1. `message` / `detail` / `error`（文字列）
/// 2. フィールドエラー `{"title": ["This field is required."]}` の先頭（文字列の配列のみ）
/// 3. `HTTP <status>`
///
/// JSON として読めない本文は message = "Unknown error"、payload = 本文の文字列。
pub(crate) fn error_from_body(status: u16, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<Value>(body) {
        Ok(payload) => {
            let message = extract_message(&payload).unwrap_or_else(|| format!("HTTP {status}"));
            ApiError::Request {
                status,
                message,
                payload,
            }
        }
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_owned();
            let payload = if text.is_empty() {
                Value::Null
            } else {
                Value::String(text)
            };
            ApiError::Request {
                status,
                message: UNKNOWN_ERROR.to_owned(),
                payload,
            }
        }
    }
}

fn extract_message(payload: &Value) -> Option<String> {
    let object = payload.as_object()?;
    for key in MESSAGE_KEYS {
        if let Some(Value::String(message)) = object.get(key)
            && !message.is_empty()
        {
            return Some(message.clone());
        }
    }
    // field errors: 文字列の配列だけを対象にする
    object
        .iter()
        .filter(|(field, _)| !MESSAGE_KEYS.contains(&field.as_str()))
        .find_map(|(field, value)| {
            let first = value.as_array()?.first()?.as_str()?;
            Some(format!("{field}: {first}"))
        })
}
