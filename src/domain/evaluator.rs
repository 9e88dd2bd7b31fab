//! Evaluator contract - pure scoring functions, one per category

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::domain::error::EvaluatorError;
use crate::domain::test_case::{Category, TestCase};

/// Normalized score threshold above which a response passes
pub const PASS_THRESHOLD: f64 = 0.7;

/// A normalized evaluation score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// In [0, 1]
    pub value: f64,
    pub passed: bool,
}

impl Score {
    /// Clamps to [0, 1] and derives pass/fail from the threshold
    pub fn from_value(value: f64) -> Self {
        let value = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            value,
            passed: value >= PASS_THRESHOLD,
        }
    }

    pub fn zero() -> Self {
        Self {
            value: 0.0,
            passed: false,
        }
    }
}

/// Scores a raw model response against a test case.
///
/// Implementations must be deterministic given the same response text and
/// test case, so cached scores stay valid without re-invocation.
pub trait Evaluator: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn score(&self, response_text: &str, case: &TestCase) -> Result<Score, EvaluatorError>;
}

/// Category-to-evaluator mapping consulted by the runner
#[derive(Debug, Clone, Default)]
pub struct EvaluatorRegistry {
    evaluators: HashMap<Category, Arc<dyn Evaluator>>,
}

impl EvaluatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, category: Category, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluators.insert(category, evaluator);
        self
    }

    pub fn get(&self, category: Category) -> Result<&Arc<dyn Evaluator>, EvaluatorError> {
        self.evaluators
            .get(&category)
            .ok_or_else(|| EvaluatorError::UnknownCategory(category.to_string()))
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}
