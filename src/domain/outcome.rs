//! Raw evaluation outcomes - one record per (provider, test case) task

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::ErrorKind;
use crate::domain::model::{ProviderIdentity, TokenUsage};
use crate::domain::test_case::{Category, Difficulty, TestCase, TestCaseId};

/// Result of one evaluation attempt. Immutable once recorded.
///
/// Invariant: `error.is_some()` implies `passed == false` and `score == 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOutcome {
    pub provider: ProviderIdentity,
    pub test_case_id: TestCaseId,
    pub category: Category,
    pub subcategory: String,
    pub difficulty: Difficulty,
    pub response_text: Option<String>,
    /// Normalized score in [0, 1]
    pub score: f64,
    pub passed: bool,
    pub latency_seconds: f64,
    pub cost_usd: f64,
    #[serde(default)]
    pub usage: TokenUsage,
    pub error: Option<ErrorKind>,
    pub from_cache: bool,
    pub timestamp: DateTime<Utc>,
}

impl RawOutcome {
    /// A completed, scored generation
    #[allow(clippy::too_many_arguments)]
    pub fn success(
        provider: ProviderIdentity,
        case: &TestCase,
        response_text: impl Into<String>,
        score: f64,
        passed: bool,
        latency_seconds: f64,
        cost_usd: f64,
        usage: TokenUsage,
    ) -> Self {
        Self {
            provider,
            test_case_id: case.id.clone(),
            category: case.category,
            subcategory: case.subcategory.clone(),
            difficulty: case.difficulty,
            response_text: Some(response_text.into()),
            score: score.clamp(0.0, 1.0),
            passed,
            latency_seconds,
            cost_usd,
            usage,
            error: None,
            from_cache: false,
            timestamp: Utc::now(),
        }
    }

    /// A terminal failure; scores 0 and never passes
    pub fn failure(provider: ProviderIdentity, case: &TestCase, kind: ErrorKind) -> Self {
        Self {
            provider,
            test_case_id: case.id.clone(),
            category: case.category,
            subcategory: case.subcategory.clone(),
            difficulty: case.difficulty,
            response_text: None,
            score: 0.0,
            passed: false,
            latency_seconds: 0.0,
            cost_usd: 0.0,
            usage: TokenUsage::default(),
            error: Some(kind),
            from_cache: false,
            timestamp: Utc::now(),
        }
    }

    /// Re-emit a stored outcome as a cache hit.
    ///
    /// Latency keeps its original value (the metrics engine excludes cache
    /// hits from latency averages); cost is zeroed so a hit is never billed
    /// twice.
    pub fn into_cache_hit(mut self) -> Self {
        self.from_cache = true;
        self.cost_usd = 0.0;
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ProviderKind;

    fn identity() -> ProviderIdentity {
        ProviderIdentity::new("test-model", ProviderKind::Local, 0.001, 0.002)
    }

    fn case() -> TestCase {
        TestCase::new(
            "ra-001",
            Category::ReasoningLogic,
            Difficulty::Medium,
            "If all bloops are razzies...",
        )
    }

    #[test]
    fn test_failure_invariant() {
        let outcome = RawOutcome::failure(identity(), &case(), ErrorKind::Timeout);

        assert!(outcome.is_error());
        assert!(!outcome.passed);
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.cost_usd, 0.0);
    }

    #[test]
    fn test_success_clamps_score() {
        let outcome = RawOutcome::success(
            identity(),
            &case(),
            "yes",
            1.2,
            true,
            0.5,
            0.001,
            TokenUsage::new(5, 5),
        );
        assert_eq!(outcome.score, 1.0);
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_cache_hit_never_double_billed() {
        let outcome = RawOutcome::success(
            identity(),
            &case(),
            "yes",
            0.9,
            true,
            1.5,
            0.42,
            TokenUsage::new(5, 5),
        );

        let hit = outcome.into_cache_hit();
        assert!(hit.from_cache);
        assert_eq!(hit.cost_usd, 0.0);
        assert_eq!(hit.latency_seconds, 1.5);
    }
}
