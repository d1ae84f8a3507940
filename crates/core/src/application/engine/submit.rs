// Submit Use Case - request validation

use crate::domain::UploadInfo;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Submit request: a prompt plus an optional uploaded file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub prompt: String,

    #[serde(default)]
    pub upload: Option<UploadInfo>,
}

impl SubmitRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            upload: None,
        }
    }

    pub fn with_upload(mut self, file_name: impl Into<String>, size_bytes: u64) -> Self {
        self.upload = Some(UploadInfo {
            file_name: file_name.into(),
            size_bytes,
        });
        self
    }
}

/// Reject a request before any job is created
///
/// The empty prompt is accepted; it selects a work item like any other string.
pub fn validate_request(
    req: &SubmitRequest,
    max_prompt_len: usize,
    max_upload_bytes: u64,
) -> Result<()> {
    let prompt_len = req.prompt.chars().count();
    if prompt_len > max_prompt_len {
        return Err(AppError::Validation(format!(
            "Prompt too long: {} characters (max {})",
            prompt_len, max_prompt_len
        )));
    }

    if let Some(upload) = &req.upload {
        if upload.file_name.trim().is_empty() {
            return Err(AppError::Validation(
                "Uploaded file name cannot be empty".to_string(),
            ));
        }
        if upload.size_bytes > max_upload_bytes {
            return Err(AppError::Validation(format!(
                "Uploaded file too large: {} bytes (max {})",
                upload.size_bytes, max_upload_bytes
            )));
        }
    }

    Ok(())
}
