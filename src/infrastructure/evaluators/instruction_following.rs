//! Instruction following evaluator

use once_cell::sync::Lazy;
use regex::Regex;

use super::word_count;
use crate::domain::error::EvaluatorError;
use crate::domain::evaluator::{Evaluator, Score};
use crate::domain::test_case::{ScoringCriteria, TestCase};

static NUMBERED_ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\d+[.)]\s+").unwrap());
static BULLET_ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[-*•]\s+").unwrap());

/// Checks structural constraints: word counts, required/forbidden substrings,
/// and response format.
///
/// Weighted blend: required substrings 0.35, word-count window 0.25, format
/// compliance 0.25, forbidden substrings 0.15.
#[derive(Debug)]
pub struct InstructionFollowingEvaluator;

impl Evaluator for InstructionFollowingEvaluator {
    fn name(&self) -> &'static str {
        "instruction_following"
    }

    fn score(&self, response_text: &str, case: &TestCase) -> Result<Score, EvaluatorError> {
        let criteria = &case.criteria;

        let required = required_substrings(response_text, criteria);
        let words = word_count_compliance(response_text, criteria);
        let format = format_compliance(response_text, criteria)?;
        let forbidden = forbidden_substrings(response_text, criteria);

        let value = required * 0.35 + words * 0.25 + format * 0.25 + forbidden * 0.15;

        Ok(Score::from_value(value))
    }
}

fn required_substrings(response: &str, criteria: &ScoringCriteria) -> f64 {
    if criteria.required_substrings.is_empty() {
        return 1.0;
    }

    let lower = response.to_lowercase();
    let found = criteria
        .required_substrings
        .iter()
        .filter(|s| lower.contains(&s.to_lowercase()))
        .count();

    found as f64 / criteria.required_substrings.len() as f64
}

fn forbidden_substrings(response: &str, criteria: &ScoringCriteria) -> f64 {
    if criteria.forbidden_substrings.is_empty() {
        return 1.0;
    }

    let lower = response.to_lowercase();
    let violations = criteria
        .forbidden_substrings
        .iter()
        .filter(|s| lower.contains(&s.to_lowercase()))
        .count();

    1.0 - violations as f64 / criteria.forbidden_substrings.len() as f64
}

fn word_count_compliance(response: &str, criteria: &ScoringCriteria) -> f64 {
    let count = word_count(response);

    match (criteria.min_words, criteria.max_words) {
        (None, None) => 1.0,
        (min, max) => {
            let above_min = min.map_or(true, |m| count >= m);
            let below_max = max.map_or(true, |m| count <= m);
            match (above_min, below_max) {
                (true, true) => 1.0,
                // One bound violated still shows partial effort
                (true, false) | (false, true) => 0.3,
                (false, false) => 0.0,
            }
        }
    }
}

fn format_compliance(response: &str, criteria: &ScoringCriteria) -> Result<f64, EvaluatorError> {
    let Some(format) = criteria.format.as_deref() else {
        return Ok(1.0);
    };

    let compliant = match format {
        "bullet_list" => BULLET_ITEM_RE.find_iter(response).count() >= 2,
        "numbered_list" => NUMBERED_ITEM_RE.find_iter(response).count() >= 2,
        "json" => serde_json::from_str::<serde_json::Value>(response.trim()).is_ok(),
        other => {
            return Err(EvaluatorError::scoring(format!(
                "unknown format requirement '{other}'"
            )))
        }
    };

    Ok(if compliant { 1.0 } else { 0.0 })
}
