// Streaming artifact fetcher
// reason: reqwest byte streams + tokio fs, never buffers a whole payload
use async_trait::async_trait;
use futures::StreamExt;
use reelgen_core::domain::{ArtifactLocation, SourceKind, WorkItem};
use reelgen_core::port::{ArtifactFetcher, FetchError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Suffix of files still being written
const PART_SUFFIX: &str = "part";

/// Fetcher for `http(s)://` and `file://` work items
///
/// Bytes land in `<storage_dir>/<job_id>.part` and are renamed to
/// `<storage_dir>/<job_id>.<ext>` once complete, so a reader never sees a
/// partially written artifact.
pub struct StreamingArtifactFetcher {
    client: reqwest::Client,
    storage_dir: PathBuf,
}

impl StreamingArtifactFetcher {
    /// Create a fetcher with its own HTTP client
    ///
    /// # Arguments
    /// * `storage_dir` - Prepared, writable artifact directory
    /// * `timeout` - Whole-request timeout for HTTP downloads
    pub fn new(storage_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, storage_dir))
    }

    pub fn with_client(client: reqwest::Client, storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            storage_dir: storage_dir.into(),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    async fn copy_http(&self, url: &str, file: &mut File) -> Result<u64, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Network(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| FetchError::Storage(e.to_string()))?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }

    async fn copy_file(&self, source: &Path, file: &mut File) -> Result<u64, FetchError> {
        let mut src = File::open(source)
            .await
            .map_err(|e| FetchError::Source(format!("{}: {}", source.display(), e)))?;

        tokio::io::copy(&mut src, file)
            .await
            .map_err(|e| FetchError::Source(format!("{}: {}", source.display(), e)))
    }
}

#[async_trait]
impl ArtifactFetcher for StreamingArtifactFetcher {
    async fn fetch(&self, item: &WorkItem, job_id: &str) -> Result<ArtifactLocation, FetchError> {
        let kind = item
            .source_kind()
            .map_err(|e| FetchError::UnsupportedSource(e.to_string()))?;

        let final_path = self
            .storage_dir
            .join(format!("{}.{}", job_id, item.extension()));
        let part = PartFile::new(self.storage_dir.join(format!("{}.{}", job_id, PART_SUFFIX)));

        let mut file = File::create(part.path())
            .await
            .map_err(|e| FetchError::Storage(format!("{}: {}", part.path().display(), e)))?;

        debug!(job_id = %job_id, source = %item.source, "Fetching artifact");
        let written = match &kind {
            SourceKind::Http(url) => self.copy_http(url, &mut file).await?,
            SourceKind::File(path) => self.copy_file(path, &mut file).await?,
        };

        file.flush()
            .await
            .map_err(|e| FetchError::Storage(e.to_string()))?;
        file.sync_all()
            .await
            .map_err(|e| FetchError::Storage(e.to_string()))?;
        drop(file);

        tokio::fs::rename(part.path(), &final_path)
            .await
            .map_err(|e| FetchError::Storage(format!("{}: {}", final_path.display(), e)))?;
        part.disarm();

        info!(
            job_id = %job_id,
            bytes = written,
            path = %final_path.display(),
            "Artifact fetched"
        );
        Ok(ArtifactLocation::new(final_path))
    }
}

/// Removes the partial file unless disarmed; also covers a fetch future
/// dropped mid-stream on cancellation
struct PartFile {
    path: PathBuf,
    armed: bool,
}

impl PartFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove partial artifact");
            }
        }
    }
}
