//! LLM Benchmark
//!
//! A concurrent evaluation harness for comparing LLM providers:
//! - Provider clients for OpenAI, Anthropic, and local Ollama backends
//! - Per-category evaluators with deterministic scoring
//! - Fingerprint-keyed result cache with TTL
//! - Statistical aggregation with confidence intervals and effect sizes

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    BenchmarkError, BenchmarkReport, Category, Difficulty, ModelProvider, ProviderConfig,
    RawOutcome, TestCase,
};
pub use infrastructure::metrics::MetricsEngine;
pub use infrastructure::runner::{EvaluationRunner, EvaluationTarget, RunnerConfig};
