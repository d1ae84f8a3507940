// Background advancement: fetch, paced progress steps, terminal transition

use super::EngineInner;
use crate::application::cancel::CancelToken;
use crate::domain::{DomainError, JobId, JobUpdate, WorkItem, MAX_PROGRESS};
use crate::error::{AppError, Result};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// How the background routine ended
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Completed,
    Failed,
    /// Cancelled, or the job reached a terminal state elsewhere
    Halted,
}

/// Spawn the job's task plus a supervisor that turns panics and store
/// errors into a Failed job instead of leaving it in Processing.
pub(super) fn spawn(inner: Arc<EngineInner>, job_id: JobId, item: WorkItem, token: CancelToken) {
    let worker = tokio::spawn(run(Arc::clone(&inner), job_id.clone(), item, token));

    tokio::spawn(async move {
        let reason = match worker.await {
            Ok(Ok(outcome)) => {
                debug!(job_id = %job_id, outcome = ?outcome, "Background task finished");
                None
            }
            Ok(Err(e)) => {
                error!(job_id = %job_id, error = %e, "Background task failed");
                Some(e.to_string())
            }
            Err(join_err) if join_err.is_panic() => {
                error!(job_id = %job_id, error = ?join_err, "Background task panicked");
                Some(format!("background task panicked: {}", join_err))
            }
            Err(join_err) => {
                error!(job_id = %job_id, error = ?join_err, "Background task aborted");
                Some(format!("background task aborted: {}", join_err))
            }
        };

        if let Some(reason) = reason {
            let update = JobUpdate::Fail {
                reason,
                now_millis: inner.time_provider.now_millis(),
            };
            if let Err(e) = commit(&inner, &job_id, update).await {
                error!(job_id = %job_id, error = %e, "Could not mark job as failed");
            }
        }

        inner.take_handle(&job_id);
    });
}

/// Progress after `step` of `steps`; the last step always lands on 100
pub(crate) fn progress_for_step(step: u8, steps: u8) -> u8 {
    let steps = steps.max(1);
    ((u32::from(step.min(steps)) * u32::from(MAX_PROGRESS)) / u32::from(steps)) as u8
}

async fn run(
    inner: Arc<EngineInner>,
    job_id: JobId,
    item: WorkItem,
    mut token: CancelToken,
) -> Result<Outcome> {
    let fetched = tokio::select! {
        biased;
        _ = token.cancelled() => {
            info!(job_id = %job_id, "Cancelled during fetch");
            return Ok(Outcome::Halted);
        }
        result = inner.fetcher.fetch(&item, &job_id) => result,
    };

    let location = match fetched {
        Ok(location) => location,
        Err(e) => {
            error!(job_id = %job_id, source = %item.source, error = %e, "Artifact fetch failed");
            let update = JobUpdate::Fail {
                reason: e.to_string(),
                now_millis: inner.time_provider.now_millis(),
            };
            return Ok(match commit(&inner, &job_id, update).await? {
                true => Outcome::Failed,
                false => Outcome::Halted,
            });
        }
    };

    info!(job_id = %job_id, artifact = %location, "Artifact stored");
    if !commit(&inner, &job_id, JobUpdate::Artifact(location)).await? {
        return Ok(Outcome::Halted);
    }

    let steps = inner.config.progress_steps.max(1);
    for step in 1..=steps {
        // Cancellation check point
        if token.is_cancelled() {
            return Ok(Outcome::Halted);
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(Outcome::Halted),
            _ = sleep(inner.config.step_delay) => {}
        }

        let progress = progress_for_step(step, steps);
        if !commit(&inner, &job_id, JobUpdate::Progress(progress)).await? {
            return Ok(Outcome::Halted);
        }
        debug!(job_id = %job_id, progress, "Progress advanced");
    }

    let update = JobUpdate::Complete {
        now_millis: inner.time_provider.now_millis(),
    };
    if !commit(&inner, &job_id, update).await? {
        return Ok(Outcome::Halted);
    }

    info!(job_id = %job_id, "Job completed");
    Ok(Outcome::Completed)
}

/// Apply an update; `false` when the job is already terminal (e.g. cancelled)
async fn commit(inner: &EngineInner, job_id: &JobId, update: JobUpdate) -> Result<bool> {
    match inner.store.apply(job_id, update).await {
        Ok(_) => Ok(true),
        Err(AppError::Domain(DomainError::InvalidStateTransition { from, to })) => {
            warn!(job_id = %job_id, from = %from, to = %to, "Job already finished, dropping update");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_for_step_even_split() {
        let values: Vec<u8> = (1..=5).map(|s| progress_for_step(s, 5)).collect();
        assert_eq!(values, vec![20, 40, 60, 80, 100]);
    }

    #[test]
    fn test_progress_for_step_uneven_split() {
        let values: Vec<u8> = (1..=3).map(|s| progress_for_step(s, 3)).collect();
        assert_eq!(values, vec![33, 66, 100]);
        assert_eq!(progress_for_step(1, 1), 100);
        assert_eq!(progress_for_step(1, 0), 100);
    }
}
