//! Factual accuracy evaluator

use super::{normalize, numeric_match_ratio};
use crate::domain::error::EvaluatorError;
use crate::domain::evaluator::{Evaluator, Score};
use crate::domain::test_case::TestCase;

const DEFAULT_NUMERIC_TOLERANCE: f64 = 0.01;

/// Scores string/numeric agreement with the expected answer.
///
/// Weighted blend: exact match 0.30, substring match 0.20, token similarity
/// 0.20, numeric accuracy 0.15, key-phrase detection 0.15.
#[derive(Debug)]
pub struct FactualAccuracyEvaluator;

impl Evaluator for FactualAccuracyEvaluator {
    fn name(&self) -> &'static str {
        "factual_accuracy"
    }

    fn score(&self, response_text: &str, case: &TestCase) -> Result<Score, EvaluatorError> {
        let Some(expected) = case.expected_answer.as_deref() else {
            return Err(EvaluatorError::scoring(format!(
                "test case '{}' has no expected answer",
                case.id
            )));
        };

        let tolerance = case
            .criteria
            .numeric_tolerance
            .unwrap_or(DEFAULT_NUMERIC_TOLERANCE);

        let exact = exact_match(expected, response_text);
        let substring = substring_match(expected, response_text);
        let tokens = token_similarity(expected, response_text);
        let numbers = numeric_match_ratio(expected, response_text, tolerance);
        let phrases = phrase_detection(expected, response_text);

        let value =
            exact * 0.30 + substring * 0.20 + tokens * 0.20 + numbers * 0.15 + phrases * 0.15;

        Ok(Score::from_value(value))
    }
}

fn exact_match(expected: &str, actual: &str) -> f64 {
    if normalize(expected) == normalize(actual) {
        1.0
    } else {
        0.0
    }
}

fn substring_match(expected: &str, actual: &str) -> f64 {
    if normalize(actual).contains(&normalize(expected)) {
        1.0
    } else {
        0.0
    }
}

/// Jaccard similarity over lowercase token sets
fn token_similarity(expected: &str, actual: &str) -> f64 {
    let expected_tokens: std::collections::HashSet<String> =
        normalize(expected).split_whitespace().map(String::from).collect();
    let actual_tokens: std::collections::HashSet<String> =
        normalize(actual).split_whitespace().map(String::from).collect();

    if expected_tokens.is_empty() {
        return 0.0;
    }

    let intersection = expected_tokens.intersection(&actual_tokens).count();
    let union = expected_tokens.union(&actual_tokens).count();

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Fraction of 2- and 3-word phrases from the expected answer found in the
/// response. Single-word answers fall back to substring matching.
fn phrase_detection(expected: &str, actual: &str) -> f64 {
    let expected_norm = normalize(expected);
    let words: Vec<&str> = expected_norm.split_whitespace().collect();

    if words.len() < 2 {
        return substring_match(expected, actual);
    }

    let mut phrases = Vec::new();
    for i in 0..words.len() - 1 {
        phrases.push(words[i..i + 2].join(" "));
        if i + 3 <= words.len() {
            phrases.push(words[i..i + 3].join(" "));
        }
    }

    let actual_norm = normalize(actual);
    let found = phrases.iter().filter(|p| actual_norm.contains(*p)).count();

    found as f64 / phrases.len() as f64
}
