//! Request DTOs for the task service API
//!
//! Defines the structure of incoming HTTP request bodies and the validation
//! applied before any core operation runs.

use reqwest::Url;
use serde::Deserialize;

use crate::tasks::{NewTask, TaskPatch, TaskStatus};

/// Maximum title length in characters
pub const MAX_TITLE_LENGTH: usize = 100;
/// Maximum description length in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Request body for POST /tasks
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    /// Ask for a pre-signed upload URL alongside the task
    #[serde(default)]
    pub request_file_upload: bool,
    /// Content type of the file to upload
    #[serde(default)]
    pub file_type: Option<String>,
}

impl CreateTaskRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let mut errors = Vec::new();

        match &self.title {
            None => errors.push("title is required".to_string()),
            Some(title) => errors.extend(check_length("title", title, MAX_TITLE_LENGTH)),
        }
        match &self.description {
            None => errors.push("description is required".to_string()),
            Some(description) => errors.extend(check_length(
                "description",
                description,
                MAX_DESCRIPTION_LENGTH,
            )),
        }
        errors.extend(check_common(
            self.status.as_deref(),
            self.file_url.as_deref(),
            self.request_file_upload,
            self.file_type.as_deref(),
        ));

        join(errors)
    }

    /// Content type to mint an upload target for, if one was requested.
    pub fn upload_type(&self) -> Option<&str> {
        upload_type(self.request_file_upload, self.file_type.as_deref())
    }

    /// Converts a validated request into store input.
    pub fn into_new_task(self) -> NewTask {
        NewTask {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            status: self.status.and_then(|s| s.parse().ok()),
            file_url: self.file_url,
        }
    }
}

/// Request body for PUT /tasks/:id
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub request_file_upload: bool,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl UpdateTaskRequest {
    /// Validates the request data
    ///
    /// At least one field must change.
    pub fn validate(&self) -> Option<String> {
        let mut errors = Vec::new();

        if self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.file_url.is_none()
            && !self.request_file_upload
        {
            errors.push("at least one field must be provided".to_string());
        }
        if let Some(title) = &self.title {
            errors.extend(check_length("title", title, MAX_TITLE_LENGTH));
        }
        if let Some(description) = &self.description {
            errors.extend(check_length(
                "description",
                description,
                MAX_DESCRIPTION_LENGTH,
            ));
        }
        errors.extend(check_common(
            self.status.as_deref(),
            self.file_url.as_deref(),
            self.request_file_upload,
            self.file_type.as_deref(),
        ));

        join(errors)
    }

    pub fn upload_type(&self) -> Option<&str> {
        upload_type(self.request_file_upload, self.file_type.as_deref())
    }

    /// Converts a validated request into a patch.
    pub fn into_patch(self) -> TaskPatch {
        TaskPatch {
            title: self.title,
            description: self.description,
            status: self.status.and_then(|s| s.parse().ok()),
            file_url: self.file_url,
        }
    }
}

/// Request body for POST /tasks/upload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub file_type: Option<String>,
}

impl UploadRequest {
    pub fn validate(&self) -> Option<String> {
        match self.file_type.as_deref() {
            Some(file_type) if !file_type.trim().is_empty() => None,
            _ => Some("File type is required".to_string()),
        }
    }
}

// == Helpers ==
fn check_length(field: &str, value: &str, max: usize) -> Option<String> {
    let len = value.chars().count();
    if len == 0 {
        Some(format!("{} must not be empty", field))
    } else if len > max {
        Some(format!("{} must be at most {} characters", field, max))
    } else {
        None
    }
}

fn check_common(
    status: Option<&str>,
    file_url: Option<&str>,
    request_file_upload: bool,
    file_type: Option<&str>,
) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(status) = status {
        if let Err(e) = status.parse::<TaskStatus>() {
            errors.push(e);
        }
    }
    if let Some(file_url) = file_url {
        if Url::parse(file_url).is_err() {
            errors.push("fileUrl must be a valid URI".to_string());
        }
    }
    if request_file_upload && file_type.map_or(true, |t| t.trim().is_empty()) {
        errors.push("fileType is required when requestFileUpload is set".to_string());
    }
    errors
}

fn upload_type(request_file_upload: bool, file_type: Option<&str>) -> Option<&str> {
    if request_file_upload {
        file_type
    } else {
        None
    }
}

fn join(errors: Vec<String>) -> Option<String> {
    if errors.is_empty() {
        None
    } else {
        Some(errors.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(json: &str) -> CreateTaskRequest {
        serde_json::from_str(json).unwrap()
    }

    fn update(json: &str) -> UpdateTaskRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_create_request_deserialize() {
        let req = create(r#"{"title": "Buy milk", "description": "2%"}"#);
        assert!(req.validate().is_none());
        assert!(req.upload_type().is_none());

        let task = req.into_new_task();
        assert_eq!(task.title, "Buy milk");
        assert!(task.status.is_none());
    }

    #[test]
    fn test_create_requires_title_and_description() {
        let msg = create(r#"{}"#).validate().unwrap();
        assert!(msg.contains("title is required"));
        assert!(msg.contains("description is required"));
    }

    #[test]
    fn test_create_length_bounds() {
        let title = "x".repeat(MAX_TITLE_LENGTH);
        let ok = create(&format!(r#"{{"title": "{}", "description": "d"}}"#, title));
        assert!(ok.validate().is_none());

        let title = "x".repeat(MAX_TITLE_LENGTH + 1);
        let too_long = create(&format!(r#"{{"title": "{}", "description": "d"}}"#, title));
        assert!(too_long.validate().unwrap().contains("at most 100"));

        let empty = create(r#"{"title": "", "description": "d"}"#);
        assert!(empty.validate().unwrap().contains("title must not be empty"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let title = "é".repeat(MAX_TITLE_LENGTH);
        let req = create(&format!(r#"{{"title": "{}", "description": "d"}}"#, title));
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_create_rejects_unknown_status() {
        let req = create(r#"{"title": "a", "description": "b", "status": "done"}"#);
        assert!(req.validate().unwrap().contains("status must be one of"));
    }

    #[test]
    fn test_create_rejects_bad_file_url() {
        let req = create(r#"{"title": "a", "description": "b", "fileUrl": "not a url"}"#);
        assert!(req.validate().unwrap().contains("fileUrl"));
    }

    #[test]
    fn test_create_upload_requires_file_type() {
        let req = create(r#"{"title": "a", "description": "b", "requestFileUpload": true}"#);
        assert!(req.validate().unwrap().contains("fileType"));

        let req = create(
            r#"{"title": "a", "description": "b", "requestFileUpload": true, "fileType": "image/png"}"#,
        );
        assert!(req.validate().is_none());
        assert_eq!(req.upload_type(), Some("image/png"));
    }

    #[test]
    fn test_file_type_without_flag_is_ignored() {
        let req = create(r#"{"title": "a", "description": "b", "fileType": "image/png"}"#);
        assert!(req.validate().is_none());
        assert!(req.upload_type().is_none());
    }

    #[test]
    fn test_update_requires_a_field() {
        assert!(update(r#"{}"#).validate().is_some());
        assert!(update(r#"{"status": "completed"}"#).validate().is_none());
        assert!(update(r#"{"requestFileUpload": true, "fileType": "a/b"}"#)
            .validate()
            .is_none());
    }

    #[test]
    fn test_update_into_patch() {
        let patch = update(r#"{"status": "in-progress"}"#).into_patch();
        assert_eq!(patch.status, Some(TaskStatus::InProgress));
        assert!(patch.title.is_none());
    }

    #[test]
    fn test_update_rejects_empty_title() {
        assert!(update(r#"{"title": ""}"#).validate().is_some());
    }

    #[test]
    fn test_upload_request_validate() {
        let empty: UploadRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.validate().as_deref(), Some("File type is required"));

        let ok: UploadRequest = serde_json::from_str(r#"{"fileType": "image/png"}"#).unwrap();
        assert!(ok.validate().is_none());
    }
}
