//! SDK Response Types
//!
//! Mirrors the JSON bodies of the HTTP API.

use serde::{Deserialize, Serialize};

/// Response from `POST /generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub job_id: String,
}

/// Response from `GET /status/{job_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// `processing`, `completed` or `failed`
    pub status: String,
    pub progress: u8,
}

impl StatusResponse {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }

    pub fn is_terminal(&self) -> bool {
        self.status != "processing"
    }
}

/// Response from `POST /cancel/{job_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub job_id: String,
    pub status: String,
    pub progress: u8,
}

/// Response from `GET /stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total: u64,
    pub processing: u64,
    pub completed: u64,
    pub failed: u64,
    pub uptime_seconds: u64,
}

/// Response from `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
}

/// Error body returned by the service
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    pub code: String,
}
