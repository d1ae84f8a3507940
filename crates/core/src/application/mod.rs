// Application Layer - Use Cases and Business Logic

pub mod cancel;
pub mod engine;
pub mod selector;

// Re-exports
pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use engine::{EngineConfig, EngineDeps, JobEngine, SubmitRequest};
pub use selector::select;
