// Artifact storage directory

use reelgen_core::error::{AppError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

const PROBE_FILE: &str = ".reelgen-write-probe";

/// Create the artifact directory and prove it is writable
///
/// Called once at startup; an error here is fatal for the daemon.
pub async fn prepare_storage_dir(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();

    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        AppError::Storage(format!("Cannot create storage dir {}: {}", dir.display(), e))
    })?;

    let probe = dir.join(PROBE_FILE);
    tokio::fs::write(&probe, b"ok").await.map_err(|e| {
        AppError::Storage(format!("Storage dir {} is not writable: {}", dir.display(), e))
    })?;
    tokio::fs::remove_file(&probe).await?;

    info!(storage_dir = %dir.display(), "Storage directory ready");
    Ok(dir.to_path_buf())
}
