//! API Error Types
//!
//! Maps application errors to HTTP status codes and a JSON body
//! `{"error": <message>, "code": <CODE>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reelgen_core::error::AppError;
use serde_json::json;

/// Machine-readable error codes
pub mod code {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const NOT_READY: &str = "NOT_READY";
    pub const INVALID_STATE: &str = "INVALID_STATE";
    pub const THROTTLED: &str = "THROTTLED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Handler error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limit exceeded. Please slow down.")]
    Throttled,
}

/// Convenience type alias for handler return values
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::App(err) => match err {
                AppError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, code::VALIDATION_ERROR, msg.clone())
                }
                AppError::NotFound(_) => (
                    StatusCode::NOT_FOUND,
                    code::NOT_FOUND,
                    "Job not found".to_string(),
                ),
                AppError::NotReady(_) => (
                    StatusCode::BAD_REQUEST,
                    code::NOT_READY,
                    "Job not ready".to_string(),
                ),
                AppError::InvalidState(msg) => {
                    (StatusCode::CONFLICT, code::INVALID_STATE, msg.clone())
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code::INTERNAL_ERROR,
                    "An internal error occurred".to_string(),
                ),
            },
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, code::VALIDATION_ERROR, msg.clone())
            }
            ApiError::Throttled => (
                StatusCode::TOO_MANY_REQUESTS,
                code::THROTTLED,
                self.to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::App(err) if !err.is_client_error() => {
                tracing::error!(error = %err, "Internal error")
            }
            other => tracing::debug!(error = %other, "Request rejected"),
        }

        let (status, code, message) = self.parts();
        let body = json!({
            "error": message,
            "code": code,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::App(AppError::Validation("bad".into())),
                StatusCode::BAD_REQUEST,
                code::VALIDATION_ERROR,
            ),
            (
                ApiError::App(AppError::NotFound("Job 9 not found".into())),
                StatusCode::NOT_FOUND,
                code::NOT_FOUND,
            ),
            (
                ApiError::App(AppError::NotReady("Job 1 is processing".into())),
                StatusCode::BAD_REQUEST,
                code::NOT_READY,
            ),
            (
                ApiError::App(AppError::InvalidState("done".into())),
                StatusCode::CONFLICT,
                code::INVALID_STATE,
            ),
            (
                ApiError::App(AppError::Internal("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
                code::INTERNAL_ERROR,
            ),
            (
                ApiError::Throttled,
                StatusCode::TOO_MANY_REQUESTS,
                code::THROTTLED,
            ),
        ];

        for (err, status, expected_code) in cases {
            let (actual_status, actual_code, _) = err.parts();
            assert_eq!(actual_status, status);
            assert_eq!(actual_code, expected_code);
            if let ApiError::App(app) = &err {
                assert_eq!(app.is_client_error(), status.is_client_error());
            }
        }
    }

    #[test]
    fn test_internal_details_hidden() {
        let (_, _, message) = ApiError::App(AppError::Internal("secret path".into())).parts();
        assert!(!message.contains("secret"));
    }
}
