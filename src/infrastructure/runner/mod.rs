pub mod config;
pub mod engine;

pub use config::{RetryConfig, RunnerConfig};
pub use engine::{EvaluationRunner, EvaluationTarget, ProgressCallback};
