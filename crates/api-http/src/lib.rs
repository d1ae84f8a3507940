//! HTTP API Layer
//!
//! axum routes for submitting jobs, polling status and downloading artifacts.

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use server::{BoundServer, HttpServer, HttpServerConfig};
