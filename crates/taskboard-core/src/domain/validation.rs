//! Validation - ネットワーク呼び出し前の入力検証
//!
//! # ルール
//! - title: 必須、1〜100 文字
//! - description: 500 文字以下
//! - due_date: RFC 3339 か `YYYY-MM-DD`
//! - photo: JPEG / PNG / GIF / WebP、5 MiB 以下

use chrono::{DateTime, NaiveDate, Utc};

use super::errors::{FieldError, ValidationErrors};
use super::payload::{CreateTask, PhotoUpload, UpdateTask};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const PHOTO_MAX_BYTES: usize = 5 * 1024 * 1024;
pub const PHOTO_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

pub fn validate_create(data: &CreateTask) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_title(&data.title, &mut errors);
    if let Some(description) = &data.description {
        check_description(description, &mut errors);
    }
    if let Some(photo) = &data.photo
        && let Err(e) = validate_photo(photo)
    {
        errors.push(e);
    }
    errors.into_result()
}

pub fn validate_update(data: &UpdateTask) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if data.id.as_str().trim().is_empty() {
        errors.push(FieldError::new("id", "Task id is required"));
    }
    if let Some(title) = &data.title {
        check_title(title, &mut errors);
    }
    if let Some(description) = &data.description {
        check_description(description, &mut errors);
    }
    if let Some(photo) = &data.photo
        && let Err(e) = validate_photo(photo)
    {
        errors.push(e);
    }
    errors.into_result()
}

pub fn validate_photo(photo: &PhotoUpload) -> Result<(), FieldError> {
    if !photo.mime_type.starts_with("image/") {
        return Err(FieldError::new("photo", "File must be an image"));
    }
    if photo.size() > PHOTO_MAX_BYTES {
        return Err(FieldError::new("photo", "Image must be less than 5MB"));
    }
    if !PHOTO_MIME_TYPES.contains(&photo.mime_type.as_str()) {
        return Err(FieldError::new("photo", "Image must be JPEG, PNG, GIF, or WebP"));
    }
    Ok(())
}

/// 期限の文字列をパースする
///
/// 日付だけの場合はその日の 00:00 UTC として扱う。
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, FieldError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| FieldError::new("due_date", format!("'{raw}' is not a valid date")))
}

fn check_title(title: &str, errors: &mut ValidationErrors) {
    let len = title.chars().count();
    if len == 0 {
        errors.push(FieldError::new("title", "Title is required"));
    } else if len > TITLE_MAX_CHARS {
        errors.push(FieldError::new(
            "title",
            "Title must be 100 characters or less",
        ));
    }
}

fn check_description(description: &str, errors: &mut ValidationErrors) {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        errors.push(FieldError::new(
            "description",
            "Description must be 500 characters or less",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn create_requires_title() {
        let errors = validate_create(&CreateTask::new("")).unwrap_err();
        assert_eq!(errors.message_for("title"), Some("Title is required"));
    }

    #[rstest]
    #[case::exactly_max(100, true)]
    #[case::over_max(101, false)]
    #[case::single(1, true)]
    fn title_length_boundary(#[case] len: usize, #[case] ok: bool) {
        let title = "a".repeat(len);
        assert_eq!(validate_create(&CreateTask::new(title)).is_ok(), ok);
    }

    #[test]
    fn title_length_counts_chars_not_bytes() {
        // 100 文字の日本語は 300 バイトだがOK
        let title = "あ".repeat(100);
        assert!(validate_create(&CreateTask::new(title)).is_ok());
    }

    #[test]
    fn description_over_limit_is_rejected() {
        let data = CreateTask::new("ok").description("x".repeat(501));
        let errors = validate_create(&data).unwrap_err();
        assert!(errors.message_for("description").is_some());
    }

    #[test]
    fn update_with_no_fields_is_valid() {
        assert!(validate_update(&UpdateTask::new(TaskId::new("1"))).is_ok());
    }

    #[test]
    fn update_rejects_empty_title() {
        let update = UpdateTask::new(TaskId::new("1")).title("");
        assert!(validate_update(&update).is_err());
    }

    #[rstest]
    #[case::pdf("application/pdf", 10, "File must be an image")]
    #[case::too_large("image/png", PHOTO_MAX_BYTES + 1, "Image must be less than 5MB")]
    #[case::svg("image/svg+xml", 10, "Image must be JPEG, PNG, GIF, or WebP")]
    fn photo_rules(#[case] mime: &str, #[case] size: usize, #[case] message: &str) {
        let photo = PhotoUpload::new("f", mime, vec![0u8; size]);
        assert_eq!(validate_photo(&photo).unwrap_err().message, message);
    }

    #[test]
    fn jpeg_photo_is_accepted() {
        let photo = PhotoUpload::new("a.jpg", "image/jpeg", vec![0u8; 1024]);
        assert!(validate_photo(&photo).is_ok());
    }

    #[test]
    fn parse_due_date_accepts_rfc3339_and_plain_dates() {
        let expected = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(parse_due_date("2024-12-31T23:59:59Z").unwrap(), expected);

        let midnight = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(parse_due_date("2024-12-31").unwrap(), midnight);

        assert!(parse_due_date("next tuesday").is_err());
    }
}
