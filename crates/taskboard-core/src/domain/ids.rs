//! Domain identifiers.
//!
//! Task の ID はサーバー（Gateway）が採番する opaque な文字列です。
//! クライアント側では中身を解釈せず、比較とパス組み立てにだけ使います。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a Task, assigned by the Gateway.
///
/// `#[serde(transparent)]` なので JSON 上はただの文字列です。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
