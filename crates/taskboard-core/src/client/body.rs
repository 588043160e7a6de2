//! Request bodies for create / update.
//!
//! 写真のアップロードがあるときだけ multipart、それ以外は JSON。

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::domain::{CreateTask, FieldError, PhotoUpload, UpdateTask};
use crate::error::ApiError;

/// 送信用のフィールド（multipart と JSON の共通表現）
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldValue {
    Text(String),
    Bool(bool),
    /// due_date のクリア（JSON は null、multipart は空文字）
    Cleared,
}

#[derive(Debug, Clone)]
pub(crate) struct TaskForm {
    pub(crate) fields: Vec<(&'static str, FieldValue)>,
    pub(crate) photo: Option<PhotoUpload>,
}

#[derive(Debug)]
pub(crate) enum RequestBody {
    Json(Value),
    Multipart(reqwest::multipart::Form),
}

impl TaskForm {
    pub(crate) fn for_create(data: &CreateTask) -> Self {
        let mut fields = vec![("title", FieldValue::Text(data.title.clone()))];
        if let Some(description) = data.description.as_deref().filter(|d| !d.is_empty()) {
            fields.push(("description", FieldValue::Text(description.to_owned())));
        }
        if let Some(due) = data.due_date {
            fields.push(("due_date", FieldValue::Text(format_timestamp(due))));
        }
        if let Some(priority) = data.priority {
            fields.push(("priority", FieldValue::Text(priority.as_str().to_owned())));
        }
        if let Some(status) = data.status {
            fields.push(("status", FieldValue::Text(status.as_str().to_owned())));
        }
        Self {
            fields,
            photo: data.photo.clone(),
        }
    }

    pub(crate) fn for_update(data: &UpdateTask) -> Self {
        let mut fields = Vec::new();
        if let Some(title) = data.title.as_deref().filter(|t| !t.is_empty()) {
            fields.push(("title", FieldValue::Text(title.to_owned())));
        }
        if let Some(description) = &data.description {
            fields.push(("description", FieldValue::Text(description.clone())));
        }
        match data.due_date {
            Some(Some(due)) => fields.push(("due_date", FieldValue::Text(format_timestamp(due)))),
            Some(None) => fields.push(("due_date", FieldValue::Cleared)),
            None => {}
        }
        if let Some(priority) = data.priority {
            fields.push(("priority", FieldValue::Text(priority.as_str().to_owned())));
        }
        if let Some(status) = data.status {
            fields.push(("status", FieldValue::Text(status.as_str().to_owned())));
        }
        if let Some(completed) = data.completed {
            fields.push(("completed", FieldValue::Bool(completed)));
        }
        Self {
            fields,
            photo: data.photo.clone(),
        }
    }

    pub(crate) fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in &self.fields {
            let value = match value {
                FieldValue::Text(text) => Value::String(text.clone()),
                FieldValue::Bool(flag) => Value::Bool(*flag),
                FieldValue::Cleared => Value::Null,
            };
            object.insert((*name).to_owned(), value);
        }
        Value::Object(object)
    }

    pub(crate) fn into_body(self) -> Result<RequestBody, ApiError> {
        let Some(photo) = self.photo.clone() else {
            return Ok(RequestBody::Json(self.to_json()));
        };

        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.fields {
            let text = match value {
                FieldValue::Text(text) => text,
                FieldValue::Bool(flag) => flag.to_string(),
                FieldValue::Cleared => String::new(),
            };
            form = form.text(name, text);
        }
        let part = reqwest::multipart::Part::bytes(photo.bytes)
            .file_name(photo.file_name)
            .mime_str(&photo.mime_type)
            .map_err(|e| {
                ApiError::from(crate::domain::ValidationErrors::from(FieldError::new(
                    "photo",
                    format!("invalid MIME type: {e}"),
                )))
            })?;
        form = form.part("photo", part);
        Ok(RequestBody::Multipart(form))
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskId, TaskPriority, TaskStatus};
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn create_json_contains_only_supplied_fields() {
        let data = CreateTask::new("Buy milk")
            .description("")
            .priority(TaskPriority::High);
        let json = TaskForm::for_create(&data).to_json();
        assert_eq!(json, json!({"title": "Buy milk", "priority": "high"}));
    }

    #[test]
    fn create_formats_due_date_as_rfc3339() {
        let due = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let json = TaskForm::for_create(&CreateTask::new("x").due_date(due)).to_json();
        assert_eq!(json["due_date"], "2024-12-31T23:59:59Z");
    }

    #[test]
    fn update_json_sends_completed_and_cleared_due_date() {
        let data = UpdateTask::new(TaskId::new("7"))
            .status(TaskStatus::Done)
            .completed(true)
            .clear_due_date();
        let json = TaskForm::for_update(&data).to_json();
        assert_eq!(
            json,
            json!({"due_date": null, "status": "done", "completed": true})
        );
    }

    #[test]
    fn update_keeps_empty_description_but_drops_empty_title() {
        let data = UpdateTask::new(TaskId::new("7")).title("").description("");
        let form = TaskForm::for_update(&data);
        assert_eq!(
            form.fields,
            vec![("description", FieldValue::Text(String::new()))]
        );
    }

    #[test]
    fn photo_switches_to_multipart() {
        let data = CreateTask::new("With photo")
            .photo(PhotoUpload::new("a.png", "image/png", vec![1, 2, 3]));
        let body = TaskForm::for_create(&data).into_body().unwrap();
        assert!(matches!(body, RequestBody::Multipart(_)));

        let body = TaskForm::for_create(&CreateTask::new("No photo")).into_body().unwrap();
        assert!(matches!(body, RequestBody::Json(_)));
    }

    #[test]
    fn malformed_mime_type_is_a_validation_error() {
        let data = CreateTask::new("x").photo(PhotoUpload::new("a", "not a mime", vec![0]));
        let err = TaskForm::for_create(&data).into_body().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
