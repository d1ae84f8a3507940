//! Real TCP server driven through the SDK

mod common;

use common::{Fixture, FIRST_BYTES};
use reelgen_api_http::{HttpServer, HttpServerConfig};
use reelgen_sdk::{ReelgenClient, SdkError};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct RunningServer {
    client: ReelgenClient,
    fixture: Fixture,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    async fn start(steps: u8, delay: Duration) -> Self {
        let fixture = Fixture::new(steps, delay);
        let config = HttpServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..HttpServerConfig::default()
        };
        let bound = HttpServer::new(config, fixture.engine.clone())
            .bind()
            .await
            .unwrap();
        let addr = bound.local_addr().unwrap();

        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(bound.serve(async {
            let _ = stopped.await;
        }));

        Self {
            client: ReelgenClient::new(format!("http://{}", addr)).unwrap(),
            fixture,
            stop: Some(stop),
            handle,
        }
    }

    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_full_flow_over_http() {
    let server = RunningServer::start(5, Duration::from_millis(20)).await;
    let client = &server.client;

    let info = client.info().await.unwrap();
    assert_eq!(info.message, "Reelgen job API running");

    let job = client.generate("hello", None).await.unwrap();
    assert_eq!(job.job_id, "1");

    let first = client.status(&job.job_id).await.unwrap();
    assert_eq!(first.status, "processing");

    let err = client
        .download(&job.job_id, server.fixture.assets.path().join("early.mp4"))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Api { status: 400, ref code, .. } if code == "NOT_READY"));

    let done = client
        .wait_for_completion(&job.job_id, Duration::from_millis(10), Duration::from_secs(5))
        .await
        .unwrap();
    assert!(done.is_completed());
    assert_eq!(done.progress, 100);

    let out = TempDir::new().unwrap();
    let dest = out.path().join("generated.mp4");
    let written = client.download(&job.job_id, &dest).await.unwrap();
    assert_eq!(written, FIRST_BYTES.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), FIRST_BYTES);

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.completed, 1);

    server.shutdown().await;
}

#[tokio::test]
async fn test_upload_and_cancel_over_http() {
    let server = RunningServer::start(5, Duration::from_secs(10)).await;
    let client = &server.client;

    let reference = server.fixture.assets.path().join("ref.png");
    std::fs::write(&reference, b"reference image").unwrap();

    let job = client.generate("a cat", Some(&reference)).await.unwrap();
    let recorded = server
        .fixture
        .engine
        .get_job(&job.job_id)
        .await
        .unwrap()
        .unwrap();
    let upload = recorded.upload.unwrap();
    assert_eq!(upload.file_name, "ref.png");
    assert_eq!(upload.size_bytes, b"reference image".len() as u64);

    let cancelled = client.cancel(&job.job_id).await.unwrap();
    assert_eq!(cancelled.status, "failed");

    let err = client.cancel(&job.job_id).await.unwrap_err();
    assert!(matches!(err, SdkError::Api { status: 409, .. }));

    let status = client.status(&job.job_id).await.unwrap();
    assert_eq!(status.status, "failed");

    server.shutdown().await;
}

#[tokio::test]
async fn test_unknown_job_over_http() {
    let server = RunningServer::start(1, Duration::from_millis(10)).await;

    let err = server.client.status("999").await.unwrap_err();
    assert!(err.is_not_found());
    match err {
        SdkError::Api { message, code, .. } => {
            assert_eq!(message, "Job not found");
            assert_eq!(code, "NOT_FOUND");
        }
        other => panic!("unexpected error: {other}"),
    }

    server.shutdown().await;
}
