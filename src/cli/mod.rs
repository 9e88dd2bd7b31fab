//! CLI module for the LLM benchmark harness
//!
//! Provides the `run` subcommand, which evaluates every configured provider
//! against a test case dataset and emits a JSON report.

pub mod run;

use clap::{Parser, Subcommand};

/// LLM Benchmark - Concurrent evaluation harness for multiple LLM providers
#[derive(Parser)]
#[command(name = "llm-benchmark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the benchmark and emit a JSON report
    Run(run::RunArgs),
}
