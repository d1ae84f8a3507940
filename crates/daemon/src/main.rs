//! Reelgen - Main Entry Point
//! HTTP API + in-memory job engine

mod config;
mod logging;

use anyhow::{Context, Result};
use config::{DaemonConfig, IdStrategy};
use logging::LogFormat;
use std::sync::Arc;
use tracing::info;

use reelgen_api_http::{HttpServer, HttpServerConfig};
use reelgen_core::application::{EngineConfig, EngineDeps, JobEngine};
use reelgen_core::port::{IdProvider, SequentialIdProvider, SystemTimeProvider, UuidProvider};
use reelgen_core::VERSION;
use reelgen_infra_fetch::{prepare_storage_dir, StreamingArtifactFetcher};
use reelgen_infra_memory::MemoryJobStore;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env (if any) and configuration
    let dotenv = dotenvy::dotenv().ok();
    let config = DaemonConfig::from_env().context("Invalid configuration")?;

    // 2. Initialize logging
    logging::init(LogFormat::parse(&config.log_format))?;
    info!("Reelgen v{} starting...", VERSION);
    if let Some(path) = dotenv {
        info!(path = %path.display(), "Loaded .env file");
    }

    // 3. Catalog and storage
    let catalog = config.load_catalog().context("Failed to load catalog")?;
    info!(items = catalog.len(), "Catalog loaded");

    let storage_dir = prepare_storage_dir(&config.storage_dir)
        .await
        .context("Storage directory unavailable")?;

    // 4. Setup dependencies (DI wiring)
    let id_provider: Arc<dyn IdProvider> = match config.id_strategy {
        IdStrategy::Sequential => Arc::new(SequentialIdProvider::new()),
        IdStrategy::Uuid => Arc::new(UuidProvider),
    };
    let fetcher = StreamingArtifactFetcher::new(storage_dir, config.fetch_timeout)
        .map_err(|e| anyhow::anyhow!("HTTP client setup failed: {}", e))?;

    let engine = JobEngine::new(
        EngineDeps {
            store: Arc::new(MemoryJobStore::new()),
            fetcher: Arc::new(fetcher),
            id_provider,
            time_provider: Arc::new(SystemTimeProvider),
            catalog,
        },
        EngineConfig {
            progress_steps: config.progress_steps,
            step_delay: config.step_delay,
            max_upload_bytes: config.max_upload_bytes,
            ..EngineConfig::default()
        },
    );

    // 5. Start HTTP server
    let server_config = HttpServerConfig {
        host: config.host.clone(),
        port: config.port,
        cors_origins: config.cors_origins.clone(),
        rate_limit_burst: config.rate_limit_burst,
        rate_limit_rate: config.rate_limit_rate,
    };
    let server = HttpServer::new(server_config, engine.clone())
        .bind()
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;

    info!(addr = %server.local_addr()?, "System ready. Press Ctrl+C to shutdown");

    // 6. Serve until Ctrl+C
    server.serve(shutdown_signal()).await?;

    // Background tasks die with the process; nothing is persisted
    info!(
        abandoned_jobs = engine.running_count(),
        "Shutdown complete."
    );
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received. Exiting gracefully..."),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await
        }
    }
}
