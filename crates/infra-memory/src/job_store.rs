// In-memory JobStore Implementation

use async_trait::async_trait;
use reelgen_core::domain::{Job, JobId, JobStats, JobStatus, JobUpdate};
use reelgen_core::error::{AppError, Result};
use reelgen_core::port::JobStore;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Process-lifetime job registry
///
/// A single `RwLock` guards the map. Each call takes the lock once and never
/// awaits anything else while holding it, so every read sees a whole record
/// and every update is applied atomically. Jobs are never evicted.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, job: &Job) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(AppError::InvalidState(format!(
                "Job {} already exists",
                job.id
            )));
        }
        jobs.insert(job.id.clone(), job.clone());
        debug!(job_id = %job.id, total = jobs.len(), "Job inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn apply(&self, id: &JobId, update: JobUpdate) -> Result<Job> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))?;
        update.apply_to(job)?;
        Ok(job.clone())
    }

    async fn count_by_status(&self, status: JobStatus) -> Result<u64> {
        let jobs = self.jobs.read().await;
        Ok(jobs.values().filter(|job| job.status == status).count() as u64)
    }

    // Single pass under one read lock so the counts are mutually consistent
    async fn stats(&self) -> Result<JobStats> {
        let jobs = self.jobs.read().await;
        let mut stats = JobStats {
            total: jobs.len() as u64,
            ..JobStats::default()
        };
        for job in jobs.values() {
            match job.status {
                JobStatus::Processing => stats.processing += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed => stats.failed += 1,
            }
        }
        Ok(stats)
    }
}
