// Domain Layer - Pure business logic and entities

pub mod catalog;
pub mod error;
pub mod job;

// Re-exports
pub use catalog::{Catalog, SourceKind, WorkItem};
pub use error::DomainError;
pub use job::{
    ArtifactLocation, Job, JobId, JobStats, JobStatus, JobStatusView, JobUpdate, UploadInfo,
    MAX_PROGRESS,
};
