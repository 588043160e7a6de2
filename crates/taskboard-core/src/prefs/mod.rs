//! Prefs - テーマと言語の設定
//!
//! ブラウザ版では localStorage に保存していた小さな状態です。
//! 保存先は `PreferenceStore` port で差し替えます。
//!
//! - テーマ: key `app-theme`、値は JSON `{"mode": "light" | "dark" | "system"}`
//! - 言語: key `app-locale`、値はプレーン文字列 `en` / `cs`

mod file;

pub use file::FilePreferenceStore;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::FieldError;
use crate::ports::{PreferenceStore, PrefsError};

pub const THEME_KEY: &str = "app-theme";
pub const LOCALE_KEY: &str = "app-locale";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    /// light → dark → system → light
    pub fn next(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::System,
            ThemeMode::System => ThemeMode::Light,
        }
    }

    /// `system` を OS 側の設定で解決する
    pub fn effective(self, system_is_dark: bool) -> EffectiveTheme {
        match self {
            ThemeMode::Light => EffectiveTheme::Light,
            ThemeMode::Dark => EffectiveTheme::Dark,
            ThemeMode::System if system_is_dark => EffectiveTheme::Dark,
            ThemeMode::System => EffectiveTheme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            other => Err(FieldError::new("theme", format!("unknown theme '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveTheme {
    Light,
    Dark,
}

/// Persisted shape of the theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct ThemeRecord {
    mode: ThemeMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Cs,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Cs => "cs",
        }
    }

    /// 言語タグ（`cs-CZ` など）から推定する。未対応の言語は None
    pub fn detect(language_tag: &str) -> Option<Self> {
        let tag = language_tag.trim().to_ascii_lowercase();
        if tag.starts_with("cs") {
            Some(Locale::Cs)
        } else if tag.starts_with("en") {
            Some(Locale::En)
        } else {
            None
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Locale::En),
            "cs" => Ok(Locale::Cs),
            other => Err(FieldError::new("locale", format!("unsupported locale '{other}'"))),
        }
    }
}

/// Preferences はテーマと言語の読み書きを担当する
///
/// 壊れた値や未知の値はエラーにせずデフォルトに戻す（warn ログのみ）。
pub struct Preferences<S> {
    store: S,
    default_theme: ThemeMode,
    default_locale: Locale,
}

impl<S: PreferenceStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            default_theme: ThemeMode::default(),
            default_locale: Locale::default(),
        }
    }

    pub fn with_defaults(mut self, theme: ThemeMode, locale: Locale) -> Self {
        self.default_theme = theme;
        self.default_locale = locale;
        self
    }

    pub fn theme(&self) -> ThemeMode {
        let raw = match self.store.get(THEME_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return self.default_theme,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load theme preference");
                return self.default_theme;
            }
        };
        match serde_json::from_str::<ThemeRecord>(&raw) {
            Ok(record) => record.mode,
            Err(e) => {
                tracing::warn!(error = %e, raw = %raw, "ignoring invalid theme preference");
                self.default_theme
            }
        }
    }

    pub fn set_theme(&self, mode: ThemeMode) -> Result<(), PrefsError> {
        let raw = serde_json::to_string(&ThemeRecord { mode })?;
        self.store.set(THEME_KEY, &raw)
    }

    /// 次のテーマに切り替えて保存し、新しい値を返す
    pub fn toggle_theme(&self) -> Result<ThemeMode, PrefsError> {
        let next = self.theme().next();
        self.set_theme(next)?;
        Ok(next)
    }

    /// 保存済みの値 → 言語タグからの推定 → デフォルト の順で決める
    pub fn locale(&self, detected_language: Option<&str>) -> Locale {
        match self.store.get(LOCALE_KEY) {
            Ok(Some(raw)) => match raw.parse::<Locale>() {
                Ok(locale) => return locale,
                Err(e) => tracing::warn!(error = %e, "ignoring invalid locale preference"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "failed to load locale preference"),
        }
        detected_language
            .and_then(Locale::detect)
            .unwrap_or(self.default_locale)
    }

    pub fn set_locale(&self, locale: Locale) -> Result<(), PrefsError> {
        self.store.set(LOCALE_KEY, locale.as_str())
    }
}
