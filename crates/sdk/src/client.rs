//! Reelgen Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    CancelResponse, ErrorBody, GenerateResponse, ServiceInfo, StatsResponse, StatusResponse,
};
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Reelgen HTTP API client
///
/// # Example
///
/// ```no_run
/// use reelgen_sdk::ReelgenClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReelgenClient::new("http://127.0.0.1:8000")?;
/// let status = client.status("1").await?;
/// println!("{} {}%", status.status, status.progress);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ReelgenClient {
    client: Client,
    base_url: String,
}

impl ReelgenClient {
    /// Create a client for the service at `base_url` (e.g. `http://127.0.0.1:8000`)
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl AsRef<str>) -> Self {
        Self {
            client,
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Service banner (`GET /`)
    pub async fn info(&self) -> Result<ServiceInfo> {
        let response = self.client.get(self.url("/")).send().await?;
        parse_json(response).await
    }

    /// Submit a prompt, optionally with a reference file
    ///
    /// # Arguments
    ///
    /// * `prompt` - Text prompt
    /// * `file` - Optional file sent as the `file` form field
    pub async fn generate(&self, prompt: &str, file: Option<&Path>) -> Result<GenerateResponse> {
        let mut form = Form::new().text("prompt", prompt.to_string());

        if let Some(path) = file {
            let upload = tokio::fs::File::open(path).await?;
            let len = upload.metadata().await?.len();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            let body = Body::wrap_stream(ReaderStream::new(upload));
            form = form.part("file", Part::stream_with_length(body, len).file_name(name));
        }

        let response = self
            .client
            .post(self.url("/generate"))
            .multipart(form)
            .send()
            .await?;
        parse_json(response).await
    }

    /// Current status and progress of a job
    pub async fn status(&self, job_id: &str) -> Result<StatusResponse> {
        let response = self
            .client
            .get(self.url(&format!("/status/{}", job_id)))
            .send()
            .await?;
        parse_json(response).await
    }

    /// Cancel a running job
    pub async fn cancel(&self, job_id: &str) -> Result<CancelResponse> {
        let response = self
            .client
            .post(self.url(&format!("/cancel/{}", job_id)))
            .send()
            .await?;
        parse_json(response).await
    }

    /// Job counts and uptime
    pub async fn stats(&self) -> Result<StatsResponse> {
        let response = self.client.get(self.url("/stats")).send().await?;
        parse_json(response).await
    }

    /// Stream a completed job's artifact to `dest`; returns the bytes written
    pub async fn download(&self, job_id: &str, dest: impl AsRef<Path>) -> Result<u64> {
        let response = self
            .client
            .get(self.url(&format!("/download/{}", job_id)))
            .send()
            .await?;
        let response = check_status(response).await?;

        let mut file = tokio::fs::File::create(dest.as_ref()).await?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }

    /// Poll until the job is terminal
    ///
    /// Returns the final status, which may be `failed`.
    ///
    /// # Errors
    /// - `SdkError::Timeout` if the job is still processing after `timeout`
    pub async fn wait_for_completion(
        &self,
        job_id: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<StatusResponse> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let status = self.status(job_id).await?;
            if status.is_terminal() {
                return Ok(status);
            }
            if tokio::time::Instant::now() + poll_interval > deadline {
                return Err(SdkError::Timeout(job_id.to_string()));
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

/// Turn a non-success response into `SdkError::Api`
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.code, body.error),
        Err(_) => ("HTTP_ERROR".to_string(), text),
    };
    Err(SdkError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_with(method_name: &str, route: &str, response: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method(method_name))
            .and(path(route))
            .respond_with(response)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_generate() {
        let server = server_with(
            "POST",
            "/generate",
            ResponseTemplate::new(200).set_body_json(json!({"job_id": "1"})),
        )
        .await;

        let client = ReelgenClient::new(server.uri()).unwrap();
        let response = client.generate("hello", None).await.unwrap();
        assert_eq!(response.job_id, "1");
    }

    #[tokio::test]
    async fn test_generate_with_file() {
        let server = server_with(
            "POST",
            "/generate",
            ResponseTemplate::new(200).set_body_json(json!({"job_id": "2"})),
        )
        .await;
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("ref.png");
        std::fs::write(&file, b"reference-png-bytes").unwrap();

        let client = ReelgenClient::new(server.uri()).unwrap();
        let response = client.generate("hello", Some(&file)).await.unwrap();
        assert_eq!(response.job_id, "2");

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body).into_owned();
        assert!(body.contains("name=\"prompt\""));
        assert!(body.contains("filename=\"ref.png\""));
        assert!(body.contains("reference-png-bytes"));
    }

    #[tokio::test]
    async fn test_generate_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let client = ReelgenClient::new("http://127.0.0.1:9").unwrap();

        let err = client
            .generate("hello", Some(&dir.path().join("missing.png")))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Io(_)));
    }

    #[tokio::test]
    async fn test_status_not_found_maps_api_error() {
        let server = server_with(
            "GET",
            "/status/9",
            ResponseTemplate::new(404)
                .set_body_json(json!({"error": "Job not found", "code": "NOT_FOUND"})),
        )
        .await;

        let client = ReelgenClient::new(server.uri()).unwrap();
        let err = client.status("9").await.unwrap_err();
        assert!(err.is_not_found());
        match err {
            SdkError::Api { code, message, .. } => {
                assert_eq!(code, "NOT_FOUND");
                assert_eq!(message, "Job not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let server = server_with(
            "GET",
            "/stats",
            ResponseTemplate::new(502).set_body_string("bad gateway"),
        )
        .await;

        let client = ReelgenClient::new(server.uri()).unwrap();
        match client.stats().await.unwrap_err() {
            SdkError::Api { status, code, message } => {
                assert_eq!(status, 502);
                assert_eq!(code, "HTTP_ERROR");
                assert_eq!(message, "bad gateway");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_download_streams_to_file() {
        let payload = vec![7u8; 100_000];
        let server = server_with(
            "GET",
            "/download/1",
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/mp4")
                .set_body_bytes(payload.clone()),
        )
        .await;
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.mp4");

        let client = ReelgenClient::new(server.uri()).unwrap();
        let written = client.download("1", &dest).await.unwrap();
        assert_eq!(written, payload.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), payload);
    }

    #[tokio::test]
    async fn test_download_not_ready_leaves_no_file() {
        let server = server_with(
            "GET",
            "/download/1",
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": "Job not ready", "code": "NOT_READY"})),
        )
        .await;
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.mp4");

        let client = ReelgenClient::new(server.uri()).unwrap();
        let err = client.download("1", &dest).await.unwrap_err();
        assert!(matches!(err, SdkError::Api { status: 400, .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_wait_for_completion_times_out() {
        let server = server_with(
            "GET",
            "/status/1",
            ResponseTemplate::new(200).set_body_json(json!({"status": "processing", "progress": 20})),
        )
        .await;

        let client = ReelgenClient::new(server.uri()).unwrap();
        let err = client
            .wait_for_completion("1", Duration::from_millis(10), Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Timeout(id) if id == "1"));
    }

    #[tokio::test]
    async fn test_wait_for_completion_returns_terminal() {
        let server = server_with(
            "GET",
            "/status/1",
            ResponseTemplate::new(200).set_body_json(json!({"status": "completed", "progress": 100})),
        )
        .await;

        let client = ReelgenClient::new(format!("{}/", server.uri())).unwrap();
        let status = client
            .wait_for_completion("1", Duration::from_millis(10), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(status.is_completed());
        assert_eq!(status.progress, 100);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client = ReelgenClient::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(
            client.info().await.unwrap_err(),
            SdkError::Connection(_)
        ));
    }
}
