//! Reelgen SDK - Rust Client Library
//!
//! Async client for the Reelgen HTTP API.
//!
//! # Example
//!
//! ```no_run
//! use reelgen_sdk::ReelgenClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ReelgenClient::new("http://127.0.0.1:8000")?;
//!
//!     let job = client.generate("a cat surfing", None).await?;
//!     let status = client
//!         .wait_for_completion(&job.job_id, Duration::from_millis(500), Duration::from_secs(60))
//!         .await?;
//!     println!("Job {} is {}", job.job_id, status.status);
//!
//!     client.download(&job.job_id, "generated.mp4").await?;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::ReelgenClient;
pub use error::{Result, SdkError};
pub use types::{
    CancelResponse, GenerateResponse, ServiceInfo, StatsResponse, StatusResponse,
};
