// Reelgen Infrastructure - Fetch & Storage Adapters
// Implements: ArtifactFetcher

pub mod fetcher;
pub mod storage;

pub use fetcher::StreamingArtifactFetcher;
pub use storage::prepare_storage_dir;
