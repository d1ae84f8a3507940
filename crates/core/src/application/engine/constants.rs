// Engine constants (no magic values)
use std::time::Duration;

/// Number of progress steps after the artifact is fetched
pub const DEFAULT_PROGRESS_STEPS: u8 = 5;

/// Pacing delay between two progress steps (1s)
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_secs(1);

/// Longest accepted prompt, in characters
pub const DEFAULT_MAX_PROMPT_LEN: usize = 4000;

/// Largest accepted upload (50 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Failure reason recorded on cancelled jobs
pub const CANCELLED_REASON: &str = "cancelled";
