// Job Store Port (Interface)

use crate::domain::{Job, JobId, JobStats, JobStatus, JobUpdate};
use crate::error::Result;
use async_trait::async_trait;

/// Concurrent registry of job records, source of truth for status and progress
///
/// Every call is atomic with respect to a single record: readers never see a
/// half-applied update.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job; fails if the id is already taken
    async fn insert(&self, job: &Job) -> Result<()>;

    /// Find job by ID (returns a snapshot)
    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>>;

    /// Apply one update under the record's lock and return the new snapshot
    ///
    /// # Errors
    /// - `AppError::NotFound` if the id is unknown
    /// - `AppError::Domain` if the update violates a job invariant (record unchanged)
    async fn apply(&self, id: &JobId, update: JobUpdate) -> Result<Job>;

    /// Count jobs by status
    async fn count_by_status(&self, status: JobStatus) -> Result<u64>;

    /// Counts for every status
    async fn stats(&self) -> Result<JobStats> {
        let processing = self.count_by_status(JobStatus::Processing).await?;
        let completed = self.count_by_status(JobStatus::Completed).await?;
        let failed = self.count_by_status(JobStatus::Failed).await?;
        Ok(JobStats {
            total: processing + completed + failed,
            processing,
            completed,
            failed,
        })
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::JobStatusView;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Store that keeps every committed view per job, for ordering assertions
    #[derive(Default)]
    pub struct RecordingJobStore {
        jobs: Mutex<HashMap<JobId, Job>>,
        history: Mutex<HashMap<JobId, Vec<JobStatusView>>>,
    }

    impl RecordingJobStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// All views committed for a job, in commit order
        pub fn history(&self, id: &str) -> Vec<JobStatusView> {
            self.history
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .unwrap_or_default()
        }

        fn record(&self, job: &Job) {
            self.history
                .lock()
                .unwrap()
                .entry(job.id.clone())
                .or_default()
                .push(job.view());
        }
    }

    #[async_trait]
    impl JobStore for RecordingJobStore {
        async fn insert(&self, job: &Job) -> Result<()> {
            let mut jobs = self.jobs.lock().unwrap();
            if jobs.contains_key(&job.id) {
                return Err(AppError::InvalidState(format!(
                    "Job {} already exists",
                    job.id
                )));
            }
            jobs.insert(job.id.clone(), job.clone());
            self.record(job);
            Ok(())
        }

        async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
            Ok(self.jobs.lock().unwrap().get(id).cloned())
        }

        async fn apply(&self, id: &JobId, update: JobUpdate) -> Result<Job> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs
                .get_mut(id)
                .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))?;
            update.apply_to(job)?;
            let snapshot = job.clone();
            self.record(&snapshot);
            Ok(snapshot)
        }

        async fn count_by_status(&self, status: JobStatus) -> Result<u64> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs.values().filter(|job| job.status == status).count() as u64)
        }
    }
}
