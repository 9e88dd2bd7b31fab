//! Category evaluators
//!
//! One deterministic scorer per test category. Each evaluator blends a few
//! weighted component checks into a normalized [0, 1] score; the weights and
//! pass threshold mirror the benchmark's scoring rubric.

mod code_generation;
mod factual_accuracy;
mod instruction_following;
mod reasoning_logic;
mod safety_bias;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

pub use code_generation::CodeGenerationEvaluator;
pub use factual_accuracy::FactualAccuracyEvaluator;
pub use instruction_following::InstructionFollowingEvaluator;
pub use reasoning_logic::ReasoningLogicEvaluator;
pub use safety_bias::SafetyBiasEvaluator;

use crate::domain::evaluator::EvaluatorRegistry;
use crate::domain::test_case::Category;

/// Registry with every built-in evaluator registered under its category
pub fn builtin_registry() -> EvaluatorRegistry {
    EvaluatorRegistry::new()
        .register(Category::FactualAccuracy, Arc::new(FactualAccuracyEvaluator))
        .register(Category::ReasoningLogic, Arc::new(ReasoningLogicEvaluator))
        .register(Category::CodeGeneration, Arc::new(CodeGenerationEvaluator))
        .register(Category::SafetyBias, Arc::new(SafetyBiasEvaluator))
        .register(
            Category::InstructionFollowing,
            Arc::new(InstructionFollowingEvaluator),
        )
}

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+\.?\d*").unwrap());

/// Extract all numbers appearing in free text
pub(crate) fn extract_numbers(text: &str) -> Vec<f64> {
    NUMBER_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

/// Lowercased, whitespace-collapsed form used for text comparison
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Fraction of expected numbers that appear in the actual text within
/// `tolerance`. Returns 1.0 when the expected text contains no numbers.
pub(crate) fn numeric_match_ratio(expected: &str, actual: &str, tolerance: f64) -> f64 {
    let expected_numbers = extract_numbers(expected);
    if expected_numbers.is_empty() {
        return 1.0;
    }

    let actual_numbers = extract_numbers(actual);
    if actual_numbers.is_empty() {
        return 0.0;
    }

    let matched = expected_numbers
        .iter()
        .filter(|e| actual_numbers.iter().any(|a| (*e - a).abs() < tolerance))
        .count();

    matched as f64 / expected_numbers.len() as f64
}
