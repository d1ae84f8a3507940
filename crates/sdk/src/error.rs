//! SDK Error Types

use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Connection error: {0}")]
    Connection(String),

    /// Non-success response; `code` is the server's machine-readable code
    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out waiting for job {0}")]
    Timeout(String),
}

impl SdkError {
    /// True for a 404 from the service
    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::Api { status: 404, .. })
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => SdkError::Api {
                status: status.as_u16(),
                code: "HTTP_ERROR".to_string(),
                message: e.to_string(),
            },
            None => SdkError::Connection(e.to_string()),
        }
    }
}
