// Job Domain Model

use crate::domain::catalog::WorkItem;
use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Job ID (opaque string issued by an IdProvider)
pub type JobId = String;

/// Upper bound of the progress percentage
pub const MAX_PROGRESS: u8 = 100;

/// Job Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Location of the stored artifact bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLocation(PathBuf);

impl ArtifactLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Metadata of the optional file submitted with a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadInfo {
    pub file_name: String,
    pub size_bytes: u64,
}

/// Status projection served to pollers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusView {
    pub status: JobStatus,
    pub progress: u8,
}

/// Job counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStats {
    pub total: u64,
    pub processing: u64,
    pub completed: u64,
    pub failed: u64,
}

/// Job Entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub prompt: String,
    pub work_item: WorkItem,

    pub status: JobStatus,
    pub progress: u8,
    pub artifact: Option<ArtifactLocation>,

    pub upload: Option<UploadInfo>,
    pub error: Option<String>,

    pub created_at: i64, // epoch ms
    pub finished_at: Option<i64>,
}

impl Job {
    /// Create a new job in `Processing` with zero progress
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `prompt` - Submitted prompt
    /// * `work_item` - Catalog entry selected for the prompt
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        prompt: impl Into<String>,
        work_item: WorkItem,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            work_item,
            status: JobStatus::Processing,
            progress: 0,
            artifact: None,
            upload: None,
            error: None,
            created_at,
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != JobStatus::Processing
    }

    pub fn view(&self) -> JobStatusView {
        JobStatusView {
            status: self.status,
            progress: self.progress,
        }
    }

    fn ensure_processing(&self, to: &str) -> Result<()> {
        if self.status != JobStatus::Processing {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    /// Move progress forward; equal values are accepted as a no-op
    pub fn advance_to(&mut self, progress: u8) -> Result<()> {
        self.ensure_processing("processing")?;
        if progress > MAX_PROGRESS {
            return Err(DomainError::ProgressOutOfRange(progress));
        }
        if progress < self.progress {
            return Err(DomainError::ProgressRegression {
                current: self.progress,
                requested: progress,
            });
        }
        self.progress = progress;
        Ok(())
    }

    /// Record where the fetched bytes were stored
    pub fn attach_artifact(&mut self, location: ArtifactLocation) -> Result<()> {
        self.ensure_processing("processing")?;
        if self.artifact.is_some() {
            return Err(DomainError::ArtifactAlreadyAttached(self.id.clone()));
        }
        self.artifact = Some(location);
        Ok(())
    }

    /// Transition to Completed with explicit timestamp
    pub fn complete(&mut self, now_millis: i64) -> Result<()> {
        self.ensure_processing("completed")?;
        if self.artifact.is_none() {
            return Err(DomainError::MissingArtifact(self.id.clone()));
        }
        self.status = JobStatus::Completed;
        self.progress = MAX_PROGRESS;
        self.finished_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Failed with explicit timestamp; progress keeps its last value
    pub fn fail(&mut self, reason: impl Into<String>, now_millis: i64) -> Result<()> {
        self.ensure_processing("failed")?;
        self.status = JobStatus::Failed;
        self.error = Some(reason.into());
        self.finished_at = Some(now_millis);
        Ok(())
    }

    /// Readable artifact, only once the job is Completed
    pub fn completed_artifact(&self) -> Option<&ArtifactLocation> {
        match self.status {
            JobStatus::Completed => self.artifact.as_ref(),
            _ => None,
        }
    }
}

/// A single atomic mutation of a job record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobUpdate {
    Progress(u8),
    Artifact(ArtifactLocation),
    Complete { now_millis: i64 },
    Fail { reason: String, now_millis: i64 },
}

impl JobUpdate {
    /// Apply to a job; on error the job is left untouched
    pub fn apply_to(self, job: &mut Job) -> Result<()> {
        match self {
            JobUpdate::Progress(progress) => job.advance_to(progress),
            JobUpdate::Artifact(location) => job.attach_artifact(location),
            JobUpdate::Complete { now_millis } => job.complete(now_millis),
            JobUpdate::Fail { reason, now_millis } => job.fail(reason, now_millis),
        }
    }
}
