// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid job state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Progress cannot move backwards: {current} -> {requested}")]
    ProgressRegression { current: u8, requested: u8 },

    #[error("Progress out of range: {0}")]
    ProgressOutOfRange(u8),

    #[error("Artifact already attached to job {0}")]
    ArtifactAlreadyAttached(String),

    #[error("Job {0} has no artifact")]
    MissingArtifact(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
