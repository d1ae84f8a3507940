// Job Engine - creation, background advancement and state transitions

mod advance;
pub mod constants;
pub mod submit;


pub use submit::{validate_request, SubmitRequest};

use crate::application::cancel::{cancel_pair, CancelHandle};
use crate::application::selector::select;
use crate::domain::{
    ArtifactLocation, Catalog, DomainError, Job, JobId, JobStats, JobStatusView, JobUpdate,
};
use crate::error::{AppError, Result};
use crate::port::{ArtifactFetcher, IdProvider, JobStore, TimeProvider};
use constants::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

/// Engine tuning
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Progress steps after the fetch; each adds an equal share of 100
    pub progress_steps: u8,
    /// Pacing delay before each step
    pub step_delay: Duration,
    pub max_prompt_len: usize,
    pub max_upload_bytes: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            progress_steps: DEFAULT_PROGRESS_STEPS,
            step_delay: DEFAULT_STEP_DELAY,
            max_prompt_len: DEFAULT_MAX_PROMPT_LEN,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Injected collaborators
pub struct EngineDeps {
    pub store: Arc<dyn JobStore>,
    pub fetcher: Arc<dyn ArtifactFetcher>,
    pub id_provider: Arc<dyn IdProvider>,
    pub time_provider: Arc<dyn TimeProvider>,
    pub catalog: Catalog,
}

pub(crate) struct EngineInner {
    store: Arc<dyn JobStore>,
    fetcher: Arc<dyn ArtifactFetcher>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    catalog: Catalog,
    config: EngineConfig,
    running: Mutex<HashMap<JobId, CancelHandle>>,
}

/// Job Engine
///
/// Cheap to clone; all clones share the same store and running-job registry.
/// `submit` must be called from within a tokio runtime.
#[derive(Clone)]
pub struct JobEngine {
    inner: Arc<EngineInner>,
}

impl JobEngine {
    pub fn new(deps: EngineDeps, config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store: deps.store,
                fetcher: deps.fetcher,
                id_provider: deps.id_provider,
                time_provider: deps.time_provider,
                catalog: deps.catalog,
                config,
                running: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Create a job and start its background work
    ///
    /// Returns as soon as the record is stored; fetch and progress run on a
    /// spawned task.
    pub async fn submit(&self, req: SubmitRequest) -> Result<JobId> {
        let inner = &self.inner;
        validate_request(&req, inner.config.max_prompt_len, inner.config.max_upload_bytes)?;

        let job_id = inner.id_provider.generate_id();
        let item = select(&req.prompt, &inner.catalog).clone();

        let mut job = Job::new(
            job_id.clone(),
            inner.time_provider.now_millis(),
            req.prompt,
            item.clone(),
        );
        job.upload = req.upload;

        // Registered before the record is visible so a cancel can never miss it
        let (handle, token) = cancel_pair();
        inner
            .running
            .lock()
            .map_err(|_| AppError::Internal("running-job registry poisoned".to_string()))?
            .insert(job_id.clone(), handle);

        if let Err(e) = inner.store.insert(&job).await {
            inner.take_handle(&job_id);
            return Err(e);
        }

        info!(
            job_id = %job_id,
            work_item = %item.name,
            has_upload = job.upload.is_some(),
            "Job submitted"
        );

        advance::spawn(Arc::clone(&self.inner), job_id.clone(), item, token);

        Ok(job_id)
    }

    /// Status projection; `None` for ids never issued
    pub async fn get_status(&self, id: &str) -> Result<Option<JobStatusView>> {
        Ok(self
            .inner
            .store
            .find_by_id(&id.to_string())
            .await?
            .map(|job| job.view()))
    }

    /// Full job record
    pub async fn get_job(&self, id: &str) -> Result<Option<Job>> {
        self.inner.store.find_by_id(&id.to_string()).await
    }

    /// Artifact of a completed job
    ///
    /// # Errors
    /// - `AppError::NotFound` if the id is unknown
    /// - `AppError::NotReady` if the job is still processing or failed
    pub async fn get_artifact(&self, id: &str) -> Result<ArtifactLocation> {
        let job = self.require_job(id).await?;
        job.completed_artifact()
            .cloned()
            .ok_or_else(|| AppError::NotReady(format!("Job {} is {}", id, job.status)))
    }

    /// Stop a processing job and mark it Failed
    ///
    /// # Errors
    /// - `AppError::NotFound` if the id is unknown
    /// - `AppError::InvalidState` if the job already finished
    pub async fn cancel(&self, id: &str) -> Result<JobStatusView> {
        let job = self.require_job(id).await?;
        if job.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "Job {} is already {}",
                id, job.status
            )));
        }

        let update = JobUpdate::Fail {
            reason: CANCELLED_REASON.to_string(),
            now_millis: self.inner.time_provider.now_millis(),
        };
        let updated = match self.inner.store.apply(&job.id, update).await {
            Ok(updated) => updated,
            // Finished between the read and the write
            Err(AppError::Domain(DomainError::InvalidStateTransition { from, .. })) => {
                return Err(AppError::InvalidState(format!(
                    "Job {} is already {}",
                    id, from
                )));
            }
            Err(e) => return Err(e),
        };

        match self.inner.take_handle(&job.id) {
            Some(handle) => handle.cancel(),
            None => warn!(job_id = %id, "Cancelled job had no running task"),
        }

        info!(job_id = %id, progress = updated.progress, "Job cancelled");
        Ok(updated.view())
    }

    pub async fn stats(&self) -> Result<JobStats> {
        self.inner.store.stats().await
    }

    /// Number of jobs whose background task has not finished yet
    pub fn running_count(&self) -> usize {
        self.inner.running.lock().map(|map| map.len()).unwrap_or(0)
    }

    async fn require_job(&self, id: &str) -> Result<Job> {
        self.inner
            .store
            .find_by_id(&id.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))
    }
}

impl EngineInner {
    fn take_handle(&self, id: &str) -> Option<CancelHandle> {
        self.running.lock().ok().and_then(|mut map| map.remove(id))
    }
}
