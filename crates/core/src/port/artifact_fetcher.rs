// Artifact Fetcher Port
// Abstraction for pulling a work item's bytes into storage keyed by job id

use crate::domain::{ArtifactLocation, WorkItem};
use async_trait::async_trait;
use thiserror::Error;

/// Fetch errors; all of them end the job as Failed
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Source responded with HTTP {0}")]
    Status(u16),

    #[error("Source unavailable: {0}")]
    Source(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),
}

/// Artifact Fetcher trait
///
/// Implementations:
/// - StreamingArtifactFetcher (infra-fetch): http(s) + file:// sources, streamed to disk
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Copy the item's bytes to storage under `job_id` without buffering the whole payload
    ///
    /// # Errors
    /// - FetchError::Network / Status / Source if the source cannot be read
    /// - FetchError::Storage if the bytes cannot be persisted
    async fn fetch(&self, item: &WorkItem, job_id: &str) -> Result<ArtifactLocation, FetchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock fetch behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed with `/mock/<job_id>.<ext>`
        Success,
        /// Succeed after a delay
        Delayed(Duration),
        /// Always fail with message
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
    }

    /// Mock Artifact Fetcher for testing; never touches the filesystem
    pub struct MockArtifactFetcher {
        behavior: Arc<Mutex<MockBehavior>>,
        call_count: AtomicUsize,
    }

    impl MockArtifactFetcher {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ArtifactFetcher for MockArtifactFetcher {
        async fn fetch(
            &self,
            item: &WorkItem,
            job_id: &str,
        ) -> Result<ArtifactLocation, FetchError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);

            let behavior = self.behavior.lock().unwrap().clone();
            let location = ArtifactLocation::new(format!("/mock/{}.{}", job_id, item.extension()));

            match behavior {
                MockBehavior::Success => Ok(location),
                MockBehavior::Delayed(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(location)
                }
                MockBehavior::Fail(msg) => Err(FetchError::Network(msg)),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
            }
        }
    }
}
