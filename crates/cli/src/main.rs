//! Reelgen CLI - Command-line client for the Reelgen job service

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use reelgen_sdk::{ReelgenClient, SdkError, StatsResponse, StatusResponse};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tabled::{Table, Tabled};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Parser)]
#[command(name = "reelgen-cli")]
#[command(about = "Reelgen job service CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL
    #[arg(long, env = "REELGEN_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a prompt
    Submit {
        /// Prompt text
        prompt: String,

        /// Optional reference file to upload
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Wait for the job to finish and download the artifact to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show a job's status
    Status {
        /// Job ID
        job_id: String,
    },

    /// Poll until a job finishes
    Wait {
        /// Job ID
        job_id: String,

        /// Poll interval in milliseconds
        #[arg(long, default_value = "500")]
        interval_ms: u64,

        /// Give up after this many seconds
        #[arg(long, default_value = "300")]
        timeout_secs: u64,
    },

    /// Download a completed job's artifact
    Download {
        /// Job ID
        job_id: String,

        /// Destination file
        #[arg(short, long, default_value = "generated.mp4")]
        output: PathBuf,
    },

    /// Cancel a running job
    Cancel {
        /// Job ID
        job_id: String,
    },

    /// Show service statistics
    Stats,
}

#[derive(Tabled)]
struct StatusRow {
    job_id: String,
    status: String,
    progress: String,
}

impl StatusRow {
    fn new(job_id: &str, status: &StatusResponse) -> Self {
        Self {
            job_id: job_id.to_string(),
            status: status.status.clone(),
            progress: format!("{}%", status.progress),
        }
    }
}

#[derive(Tabled)]
struct StatsRow {
    total: u64,
    processing: u64,
    completed: u64,
    failed: u64,
    uptime_seconds: u64,
}

impl From<StatsResponse> for StatsRow {
    fn from(stats: StatsResponse) -> Self {
        Self {
            total: stats.total,
            processing: stats.processing,
            completed: stats.completed,
            failed: stats.failed,
            uptime_seconds: stats.uptime_seconds,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ReelgenClient::new(&cli.api_url).context("Failed to create client")?;

    match cli.command {
        Commands::Submit {
            prompt,
            file,
            output,
        } => {
            let job = client
                .generate(&prompt, file.as_deref())
                .await
                .map_err(describe)?;
            println!("{}", "✓ Job submitted".green().bold());
            println!("  {} {}", "Job ID:".bold(), job.job_id);

            if let Some(output) = output {
                let status = wait(&client, &job.job_id, 500, 300).await?;
                if status.is_completed() {
                    download(&client, &job.job_id, &output).await?;
                }
            }
        }

        Commands::Status { job_id } => {
            let status = client.status(&job_id).await.map_err(describe)?;
            println!("{}", Table::new(vec![StatusRow::new(&job_id, &status)]));
        }

        Commands::Wait {
            job_id,
            interval_ms,
            timeout_secs,
        } => {
            wait(&client, &job_id, interval_ms, timeout_secs).await?;
        }

        Commands::Download { job_id, output } => {
            download(&client, &job_id, &output).await?;
        }

        Commands::Cancel { job_id } => {
            let response = client.cancel(&job_id).await.map_err(describe)?;
            println!(
                "{}",
                format!("✓ Job {} cancelled at {}%", response.job_id, response.progress)
                    .green()
                    .bold()
            );
        }

        Commands::Stats => {
            println!("{}", "Service Status".cyan().bold());
            println!();

            match client.stats().await {
                Ok(stats) => {
                    println!("  {} {}", "API URL:".bold(), cli.api_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    println!("{}", Table::new(vec![StatsRow::from(stats)]));
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), describe(e));
                }
            }
        }
    }

    Ok(())
}

async fn wait(
    client: &ReelgenClient,
    job_id: &str,
    interval_ms: u64,
    timeout_secs: u64,
) -> Result<StatusResponse> {
    println!("{}", format!("Waiting for job {}...", job_id).cyan());
    let status = client
        .wait_for_completion(
            job_id,
            Duration::from_millis(interval_ms),
            Duration::from_secs(timeout_secs),
        )
        .await
        .map_err(describe)?;

    if status.is_completed() {
        println!("{}", format!("✓ Job {} completed", job_id).green().bold());
    } else {
        println!(
            "{}",
            format!("✗ Job {} {} at {}%", job_id, status.status, status.progress)
                .red()
                .bold()
        );
    }
    Ok(status)
}

async fn download(client: &ReelgenClient, job_id: &str, output: &Path) -> Result<()> {
    let bytes = client.download(job_id, output).await.map_err(describe)?;
    println!(
        "{}",
        format!("✓ Saved {} bytes to {}", bytes, output.display())
            .green()
            .bold()
    );
    Ok(())
}

/// Human-readable form of an SDK error
fn describe(err: SdkError) -> anyhow::Error {
    match err {
        SdkError::Api { code, message, .. } => anyhow::anyhow!("{} ({})", message, code),
        SdkError::Connection(msg) => {
            anyhow::anyhow!("Cannot reach the service: {}", msg)
        }
        other => anyhow::Error::new(other),
    }
}
