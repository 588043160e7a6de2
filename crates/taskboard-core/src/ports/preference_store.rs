//! PreferenceStore port - 小さな key/value の永続化
//!
//! ブラウザの localStorage に相当します。値はただの文字列で、
//! JSON にするかどうかは呼び出し側（`prefs`）が決めます。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("failed to access preferences at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preferences file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// PreferenceStore は key ごとに文字列を保存する
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError>;
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        (**self).set(key, value)
    }
}
