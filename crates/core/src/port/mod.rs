// Port Layer - Interfaces for external dependencies

pub mod artifact_fetcher;
pub mod id_provider; // For deterministic testing
pub mod job_store;
pub mod time_provider;

// Re-exports
pub use artifact_fetcher::{ArtifactFetcher, FetchError};
pub use id_provider::{IdProvider, SequentialIdProvider, UuidProvider};
pub use job_store::JobStore;
pub use time_provider::{SystemTimeProvider, TimeProvider};
