//! HTTP Handlers
//!
//! Thin adapters between axum extractors and the job engine.

use crate::error::{ApiError, ApiResult};
use crate::rate_limiter::RateLimiter;
use crate::types::{CancelResponse, GenerateResponse, RootResponse, StatsResponse, StatusResponse};
use axum::body::Body;
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reelgen_core::application::{JobEngine, SubmitRequest};
use reelgen_core::error::AppError;
use reelgen_core::VERSION;
use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

const PROMPT_FIELD: &str = "prompt";
const FILE_FIELD: &str = "file";
const DOWNLOAD_STEM: &str = "generated";

/// Shared request context
pub struct ApiContext {
    pub engine: JobEngine,
    pub rate_limiter: RateLimiter,
    pub started_at: Instant,
}

pub type SharedContext = Arc<ApiContext>;

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Reelgen job API running".to_string(),
        version: VERSION.to_string(),
    })
}

/// POST /generate
///
/// Multipart form with a required `prompt` text field and an optional `file`.
/// Unknown fields are ignored.
pub async fn generate(
    State(ctx): State<SharedContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<GenerateResponse>> {
    if !ctx.rate_limiter.try_acquire() {
        warn!("Submission throttled");
        return Err(ApiError::Throttled);
    }

    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let max_upload = ctx.engine.config().max_upload_bytes;

    let mut prompt: Option<String> = None;
    let mut upload: Option<(String, u64)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(PROMPT_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                prompt = Some(text);
            }
            Some(FILE_FIELD) => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let size = drain_upload(field, max_upload).await?;
                // Browsers send an empty part when no file was picked
                if size > 0 {
                    upload = Some((file_name, size));
                }
            }
            other => {
                debug!(field = ?other, "Ignoring unknown form field");
            }
        }
    }

    let prompt = prompt.ok_or_else(|| {
        ApiError::BadRequest(format!("Missing required form field '{}'", PROMPT_FIELD))
    })?;

    let mut request = SubmitRequest::new(prompt);
    if let Some((name, size)) = upload {
        request = request.with_upload(name, size);
    }

    let job_id = ctx.engine.submit(request).await?;
    info!(job_id = %job_id, "Job accepted");
    Ok(Json(GenerateResponse { job_id }))
}

/// Consume an uploaded part chunk by chunk; only its size is kept
async fn drain_upload(mut field: Field<'_>, max_bytes: u64) -> ApiResult<u64> {
    let mut size = 0u64;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        size += chunk.len() as u64;
        if size > max_bytes {
            return Err(AppError::Validation(format!(
                "Uploaded file exceeds {} bytes",
                max_bytes
            ))
            .into());
        }
    }
    Ok(size)
}

/// GET /status/{job_id}
pub async fn status(
    State(ctx): State<SharedContext>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let view = ctx
        .engine
        .get_status(&job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;

    Ok(Json(StatusResponse {
        status: view.status,
        progress: view.progress,
    }))
}

/// GET /download/{job_id}
///
/// Streams the stored artifact; never loads it into memory.
pub async fn download(
    State(ctx): State<SharedContext>,
    Path(job_id): Path<String>,
) -> ApiResult<Response> {
    let location = ctx.engine.get_artifact(&job_id).await?;
    let path = location.as_path();

    let file = tokio::fs::File::open(path).await.map_err(|e| {
        AppError::Storage(format!("Artifact {} unreadable: {}", path.display(), e))
    })?;
    let size = file.metadata().await.map_err(AppError::Io)?.len();

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("bin");
    let disposition = format!(
        "attachment; filename=\"{}.{}\"",
        DOWNLOAD_STEM, extension
    );

    debug!(job_id = %job_id, bytes = size, "Streaming artifact");
    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(path).to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, size.to_string()),
        ],
        body,
    )
        .into_response())
}

/// POST /cancel/{job_id}
pub async fn cancel(
    State(ctx): State<SharedContext>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<CancelResponse>> {
    let view = ctx.engine.cancel(&job_id).await?;
    Ok(Json(CancelResponse {
        job_id,
        status: view.status,
        progress: view.progress,
    }))
}

/// GET /stats
pub async fn stats(State(ctx): State<SharedContext>) -> ApiResult<Json<StatsResponse>> {
    let stats = ctx.engine.stats().await?;
    Ok(Json(StatsResponse::new(
        stats,
        ctx.started_at.elapsed().as_secs(),
    )))
}

fn content_type_for(path: &FsPath) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(FsPath::new("/v/1.mp4")), "video/mp4");
        assert_eq!(content_type_for(FsPath::new("/v/1.MP4")), "video/mp4");
        assert_eq!(content_type_for(FsPath::new("/v/2.webm")), "video/webm");
        assert_eq!(content_type_for(FsPath::new("/v/3.mov")), "video/quicktime");
        assert_eq!(
            content_type_for(FsPath::new("/v/4")),
            "application/octet-stream"
        );
    }
}
