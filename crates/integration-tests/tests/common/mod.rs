//! Shared fixtures: real store + real fetcher over `file://` sources in tempdirs

#![allow(dead_code)]

use reelgen_core::application::{EngineConfig, EngineDeps, JobEngine};
use reelgen_core::domain::{Catalog, JobStatus, JobStatusView, WorkItem};
use reelgen_core::port::{ArtifactFetcher, SequentialIdProvider, SystemTimeProvider};
use reelgen_infra_fetch::StreamingArtifactFetcher;
use reelgen_infra_memory::MemoryJobStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const FIRST_BYTES: &[u8] = b"first sample video bytes";
pub const SECOND_BYTES: &[u8] = b"second sample video bytes, a little longer";

pub struct Fixture {
    pub engine: JobEngine,
    pub store: Arc<MemoryJobStore>,
    pub assets: TempDir,
    pub storage: TempDir,
}

impl Fixture {
    /// Two-item catalog of local mp4 files, real fetcher, `steps` x `delay` pacing
    pub fn new(steps: u8, delay: Duration) -> Self {
        let assets = TempDir::new().unwrap();
        let storage = TempDir::new().unwrap();

        let first = assets.path().join("first.mp4");
        let second = assets.path().join("second.mp4");
        std::fs::write(&first, FIRST_BYTES).unwrap();
        std::fs::write(&second, SECOND_BYTES).unwrap();

        let catalog = Catalog::new(vec![
            WorkItem::new("first", format!("file://{}", first.display())),
            WorkItem::new("second", format!("file://{}", second.display())),
        ])
        .unwrap();

        let fetcher =
            StreamingArtifactFetcher::new(storage.path(), Duration::from_secs(5)).unwrap();
        Self::with_parts(assets, storage, catalog, Arc::new(fetcher), steps, delay)
    }

    pub fn with_parts(
        assets: TempDir,
        storage: TempDir,
        catalog: Catalog,
        fetcher: Arc<dyn ArtifactFetcher>,
        steps: u8,
        delay: Duration,
    ) -> Self {
        let store = Arc::new(MemoryJobStore::new());
        let engine = JobEngine::new(
            EngineDeps {
                store: store.clone(),
                fetcher,
                id_provider: Arc::new(SequentialIdProvider::new()),
                time_provider: Arc::new(SystemTimeProvider),
                catalog,
            },
            EngineConfig {
                progress_steps: steps,
                step_delay: delay,
                ..EngineConfig::default()
            },
        );
        Self {
            engine,
            store,
            assets,
            storage,
        }
    }
}

/// Poll until the job is terminal; panics after `timeout`
pub async fn wait_terminal(engine: &JobEngine, job_id: &str, timeout: Duration) -> JobStatusView {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let view = engine.get_status(job_id).await.unwrap().unwrap();
        if view.status != JobStatus::Processing {
            return view;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {} still processing at {}%",
            job_id,
            view.progress
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
