//! HTTP Request/Response Types

use reelgen_core::domain::{JobStats, JobStatus};
use serde::{Deserialize, Serialize};

/// POST /generate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub job_id: String,
}

/// GET /status/{job_id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: JobStatus,
    pub progress: u8,
}

/// POST /cancel/{job_id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub progress: u8,
}

/// GET /stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total: u64,
    pub processing: u64,
    pub completed: u64,
    pub failed: u64,
    pub uptime_seconds: u64,
}

impl StatsResponse {
    pub fn new(stats: JobStats, uptime_seconds: u64) -> Self {
        Self {
            total: stats.total,
            processing: stats.processing,
            completed: stats.completed,
            failed: stats.failed,
            uptime_seconds,
        }
    }
}

/// GET /
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}
