//! Report payload handed to reporters and front-ends

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::outcome::RawOutcome;

/// Per-provider aggregate statistics, derived entirely from that provider's
/// outcomes. Recomputed fresh on every run, never persisted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateStats {
    pub provider: String,
    pub total_evaluations: usize,
    /// Mean score with failures counted as 0, never excluded
    pub overall_score: f64,
    pub pass_rate: f64,
    pub category_breakdown: BTreeMap<String, f64>,
    pub difficulty_breakdown: BTreeMap<String, f64>,
    pub total_cost_usd: f64,
    /// Mean latency over generation calls actually made (cache hits excluded)
    pub avg_latency_seconds: f64,
    /// (low, high) bounds of the normal-approximation 95% interval
    pub confidence_interval_95: (f64, f64),
    pub error_rate: f64,
}

/// Run-level metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub duration_seconds: f64,
    pub total_test_cases: usize,
    pub total_outcomes: usize,
    pub providers: Vec<String>,
    pub categories: Vec<String>,
}

/// Pairwise comparison between two providers' score distributions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderComparison {
    pub provider_a: String,
    pub provider_b: String,
    /// mean(a) - mean(b)
    pub mean_difference: f64,
    /// Cohen's d with pooled standard deviation
    pub effect_size: f64,
    pub interpretation: String,
}

/// One entry in the score-ordered provider ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRanking {
    pub provider: String,
    pub overall_score: f64,
}

/// Complete, self-consistent payload for one benchmark run.
///
/// Every outcome is traceable to exactly one (provider, test case) pair and
/// every aggregate is derivable solely from the outcome list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub metadata: RunMetadata,
    pub outcomes: Vec<RawOutcome>,
    pub stats: BTreeMap<String, AggregateStats>,
    pub comparisons: Vec<ProviderComparison>,
    pub rankings: Vec<ProviderRanking>,
}
