//! HTTP Server
//!
//! Builds the axum router and serves it over TCP with graceful shutdown.

use crate::handler::{self, ApiContext, SharedContext};
use crate::rate_limiter::RateLimiter;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use reelgen_core::application::JobEngine;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
/// Requests allowed in a burst across all clients
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 200;
/// Sustained requests per second across all clients
pub const DEFAULT_RATE_LIMIT_RATE: u32 = 100;

/// Headroom over the upload limit for the prompt and multipart framing
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    /// `["*"]` (or empty) allows any origin
    pub cors_origins: Vec<String>,
    pub rate_limit_burst: u32,
    pub rate_limit_rate: u32,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            rate_limit_burst: DEFAULT_RATE_LIMIT_BURST,
            rate_limit_rate: DEFAULT_RATE_LIMIT_RATE,
        }
    }
}

/// HTTP Server
pub struct HttpServer {
    config: HttpServerConfig,
    context: SharedContext,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, engine: JobEngine) -> Self {
        let context = Arc::new(ApiContext {
            engine,
            rate_limiter: RateLimiter::new(config.rate_limit_burst, config.rate_limit_rate),
            started_at: Instant::now(),
        });
        Self { config, context }
    }

    /// Router with all routes and layers applied
    pub fn router(&self) -> Router {
        let upload_limit = usize::try_from(self.context.engine.config().max_upload_bytes)
            .unwrap_or(usize::MAX);

        Router::new()
            .route("/", get(handler::root))
            .route("/generate", post(handler::generate))
            .route("/status/{job_id}", get(handler::status))
            .route("/download/{job_id}", get(handler::download))
            .route("/cancel/{job_id}", post(handler::cancel))
            .route("/stats", get(handler::stats))
            .layer(DefaultBodyLimit::max(
                upload_limit.saturating_add(BODY_LIMIT_SLACK),
            ))
            .layer(self.cors_layer())
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&self.context))
    }

    fn cors_layer(&self) -> CorsLayer {
        let wildcard = self.config.cors_origins.is_empty()
            || self.config.cors_origins.iter().any(|o| o == "*");

        let origin = if wildcard {
            AllowOrigin::from(Any)
        } else {
            let origins: Vec<HeaderValue> = self
                .config
                .cors_origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %o, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(origins)
        };

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    }

    /// Bind the listener; fails fast if the address is unavailable
    pub async fn bind(self) -> std::io::Result<BoundServer> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let router = self.router();

        info!(addr = %listener.local_addr()?, "HTTP server listening");
        Ok(BoundServer { listener, router })
    }
}

/// A server whose listener is bound but not yet serving
pub struct BoundServer {
    listener: TcpListener,
    router: Router,
}

impl BoundServer {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `shutdown` resolves
    pub async fn serve<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("HTTP server stopped");
        Ok(())
    }
}
