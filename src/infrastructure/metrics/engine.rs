//! Aggregation of raw outcomes into per-provider statistics and reports

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::outcome::RawOutcome;
use crate::domain::report::{
    AggregateStats, BenchmarkReport, ProviderComparison, ProviderRanking, RunMetadata,
};

use super::statistical::{cohens_d, confidence_interval_95, mean, EffectSizeInterpretation};

/// Computes aggregate statistics and comparative reports from raw outcomes.
///
/// Pure and stateless: the same outcome multiset always produces the same
/// aggregates regardless of ordering.
#[derive(Debug, Default)]
pub struct MetricsEngine;

impl MetricsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate statistics for one provider's outcomes.
    ///
    /// Failed outcomes count as score 0 rather than being excluded, so a
    /// provider cannot improve its mean by erroring out of hard cases. Cache
    /// hits are excluded from the latency average because no call was made.
    pub fn aggregate(&self, provider: &str, outcomes: &[RawOutcome]) -> AggregateStats {
        let scores: Vec<f64> = outcomes.iter().map(|o| o.score).collect();
        let total = outcomes.len();

        let pass_rate = if total == 0 {
            0.0
        } else {
            outcomes.iter().filter(|o| o.passed).count() as f64 / total as f64
        };
        let error_rate = if total == 0 {
            0.0
        } else {
            outcomes.iter().filter(|o| o.is_error()).count() as f64 / total as f64
        };

        let latencies: Vec<f64> = outcomes
            .iter()
            .filter(|o| !o.from_cache && !o.is_error())
            .map(|o| o.latency_seconds)
            .collect();

        AggregateStats {
            provider: provider.to_string(),
            total_evaluations: total,
            overall_score: mean(&scores),
            pass_rate,
            category_breakdown: breakdown(outcomes, |o| o.category.as_str().to_string()),
            difficulty_breakdown: breakdown(outcomes, |o| o.difficulty.as_str().to_string()),
            total_cost_usd: outcomes.iter().map(|o| o.cost_usd).sum(),
            avg_latency_seconds: mean(&latencies),
            confidence_interval_95: confidence_interval_95(&scores),
            error_rate,
        }
    }

    /// Per-provider aggregates keyed by the provider's display name
    pub fn aggregate_all(&self, outcomes: &[RawOutcome]) -> BTreeMap<String, AggregateStats> {
        group_by_provider(outcomes)
            .into_iter()
            .map(|(provider, group)| {
                let stats = self.aggregate(&provider, &group);
                (provider, stats)
            })
            .collect()
    }

    /// Pairwise score comparisons for every unordered provider pair.
    ///
    /// Pairs are emitted in lexicographic order so output is deterministic.
    pub fn compare_providers(&self, outcomes: &[RawOutcome]) -> Vec<ProviderComparison> {
        let groups = group_by_provider(outcomes);
        let providers: Vec<&String> = groups.keys().collect();

        let mut comparisons = Vec::new();
        for (i, a) in providers.iter().enumerate() {
            for b in providers.iter().skip(i + 1) {
                let scores_a: Vec<f64> = groups[*a].iter().map(|o| o.score).collect();
                let scores_b: Vec<f64> = groups[*b].iter().map(|o| o.score).collect();

                let effect_size = cohens_d(&scores_a, &scores_b);
                comparisons.push(ProviderComparison {
                    provider_a: (*a).clone(),
                    provider_b: (*b).clone(),
                    mean_difference: mean(&scores_a) - mean(&scores_b),
                    effect_size,
                    interpretation: EffectSizeInterpretation::from_cohens_d(effect_size)
                        .to_string(),
                });
            }
        }
        comparisons
    }

    /// Providers ordered by overall score, best first.
    ///
    /// Ties break lexicographically on the provider name.
    pub fn rank_providers(&self, stats: &BTreeMap<String, AggregateStats>) -> Vec<ProviderRanking> {
        let mut rankings: Vec<ProviderRanking> = stats
            .values()
            .map(|s| ProviderRanking {
                provider: s.provider.clone(),
                overall_score: s.overall_score,
            })
            .collect();

        rankings.sort_by(|a, b| {
            b.overall_score
                .partial_cmp(&a.overall_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.provider.cmp(&b.provider))
        });
        rankings
    }

    /// Build the full report payload for one run
    pub fn build_report(
        &self,
        outcomes: Vec<RawOutcome>,
        total_test_cases: usize,
        duration_seconds: f64,
    ) -> BenchmarkReport {
        let stats = self.aggregate_all(&outcomes);
        let comparisons = self.compare_providers(&outcomes);
        let rankings = self.rank_providers(&stats);

        let mut categories: Vec<String> = outcomes
            .iter()
            .map(|o| o.category.as_str().to_string())
            .collect();
        categories.sort();
        categories.dedup();

        let metadata = RunMetadata {
            run_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            duration_seconds,
            total_test_cases,
            total_outcomes: outcomes.len(),
            providers: stats.keys().cloned().collect(),
            categories,
        };

        debug!(
            run_id = %metadata.run_id,
            outcomes = metadata.total_outcomes,
            providers = metadata.providers.len(),
            "Built benchmark report"
        );

        BenchmarkReport {
            metadata,
            outcomes,
            stats,
            comparisons,
            rankings,
        }
    }
}

fn group_by_provider(outcomes: &[RawOutcome]) -> BTreeMap<String, Vec<RawOutcome>> {
    let mut groups: BTreeMap<String, Vec<RawOutcome>> = BTreeMap::new();
    for outcome in outcomes {
        // Keyed on model plus backend so one model served through two
        // backends is never conflated into a single aggregate.
        groups
            .entry(outcome.provider.display_name())
            .or_default()
            .push(outcome.clone());
    }
    groups
}

fn breakdown(
    outcomes: &[RawOutcome],
    key: impl Fn(&RawOutcome) -> String,
) -> BTreeMap<String, f64> {
    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for outcome in outcomes {
        grouped.entry(key(outcome)).or_default().push(outcome.score);
    }
    grouped
        .into_iter()
        .map(|(k, scores)| (k, mean(&scores)))
        .collect()
}
