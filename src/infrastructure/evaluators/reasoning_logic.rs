//! Reasoning and logic evaluator

use once_cell::sync::Lazy;
use regex::Regex;

use super::{extract_numbers, normalize, word_count};
use crate::domain::error::EvaluatorError;
use crate::domain::evaluator::{Evaluator, Score};
use crate::domain::test_case::TestCase;

const NUMERIC_TOLERANCE: f64 = 0.01;

static FINAL_ANSWER_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:final answer|answer|result|solution)(?:\s*is)?\s*:?\s*(.+?)(?:\n|$)",
        r"(?i)\b(?:therefore|thus|so|hence)\b[:,]?\s*(.+?)(?:\n|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static STRUCTURE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?m)^\s*\d+\.", r"(?i)step \d+", r"(?m)^\s*[-•]"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

const REASONING_WORDS: &[&str] = &[
    "because",
    "since",
    "therefore",
    "thus",
    "hence",
    "given that",
    "assuming",
    "consider",
    "first",
    "second",
    "next",
    "finally",
];

/// Scores the final answer plus the shape of the reasoning that produced it.
///
/// Weighted blend: answer correctness 0.40, reasoning indicators 0.25,
/// logical structure 0.15, step-by-step approach 0.10, numeric accuracy 0.10.
#[derive(Debug)]
pub struct ReasoningLogicEvaluator;

impl Evaluator for ReasoningLogicEvaluator {
    fn name(&self) -> &'static str {
        "reasoning_logic"
    }

    fn score(&self, response_text: &str, case: &TestCase) -> Result<Score, EvaluatorError> {
        let expected = case.expected_answer.as_deref().unwrap_or_default();
        let tolerance = case.criteria.numeric_tolerance.unwrap_or(NUMERIC_TOLERANCE);

        let answer = answer_correctness(expected, response_text, tolerance);
        let reasoning = reasoning_indicators(response_text);
        let structure = logical_structure(response_text);
        let steps = step_by_step(response_text);
        let numbers = super::numeric_match_ratio(expected, response_text, tolerance);

        let value =
            answer * 0.40 + reasoning * 0.25 + structure * 0.15 + steps * 0.10 + numbers * 0.10;

        Ok(Score::from_value(value))
    }
}

fn answer_correctness(expected: &str, actual: &str, tolerance: f64) -> f64 {
    if expected.is_empty() {
        return 1.0;
    }

    let final_answer = extract_final_answer(actual);

    if normalize(expected) == normalize(&final_answer) {
        return 1.0;
    }

    if normalize(actual).contains(&normalize(expected)) {
        return 0.8;
    }

    let expected_numbers = extract_numbers(expected);
    let answer_numbers = extract_numbers(&final_answer);
    if !expected_numbers.is_empty()
        && expected_numbers
            .iter()
            .any(|e| answer_numbers.iter().any(|a| (e - a).abs() < tolerance))
    {
        return 1.0;
    }

    0.0
}

/// The sentence after an "answer is" / "therefore" marker, or the last line
fn extract_final_answer(text: &str) -> String {
    for re in FINAL_ANSWER_RES.iter() {
        if let Some(captures) = re.captures(text) {
            if let Some(answer) = captures.get(1) {
                return answer.as_str().trim().to_string();
            }
        }
    }

    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or(text)
        .trim()
        .to_string()
}

fn reasoning_indicators(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let found = REASONING_WORDS
        .iter()
        .filter(|word| lower.contains(*word))
        .count() as f64;

    let mut value = (found * 0.125).min(0.6);

    // A reasonable explanation takes more than a handful of words
    match word_count(text) {
        n if n > 20 => value += 0.4,
        n if n > 10 => value += 0.2,
        _ => {}
    }

    value.min(1.0)
}

fn logical_structure(text: &str) -> f64 {
    let structured = STRUCTURE_RES
        .iter()
        .filter(|re| re.is_match(text))
        .count();

    let mut value: f64 = match structured {
        0 => 0.0,
        1 => 0.3,
        _ => 0.5,
    };

    let lower = text.to_lowercase();
    if ["premise", "assumption", "given", "conclusion"]
        .iter()
        .any(|w| lower.contains(w))
    {
        value += 0.25;
    }
    if lower.contains("if ") && lower.contains("then") {
        value += 0.25;
    }

    value.min(1.0)
}

fn step_by_step(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let markers = ["step", "first", "second", "third", "next", "then", "finally"];
    let found: usize = markers.iter().map(|m| lower.matches(m).count()).sum();

    match found {
        0 => 0.0,
        1 => 0.4,
        2 => 0.6,
        3 => 0.8,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_case::{Category, Difficulty};

    fn case(expected: &str) -> TestCase {
        TestCase::new(
            "rl-001",
            Category::ReasoningLogic,
            Difficulty::Medium,
            "A train travels 60 km in 1.5 hours. What is its average speed?",
        )
        .with_expected_answer(expected)
    }

    #[test]
    fn test_worked_solution_passes() {
        let response = "Step 1: divide the distance by the time.\n\
            Step 2: 60 / 1.5 = 40.\n\
            Since speed is distance over time, the final answer is: 40 km/h";

        let score = ReasoningLogicEvaluator
            .score(response, &case("40 km/h"))
            .unwrap();
        assert!(score.passed, "score was {}", score.value);
    }

    #[test]
    fn test_bare_wrong_answer_fails() {
        let score = ReasoningLogicEvaluator.score("90", &case("40")).unwrap();
        assert!(!score.passed);
    }

    #[test]
    fn test_final_answer_extraction() {
        assert_eq!(extract_final_answer("Therefore, the answer is 40."), "40.");
        assert_eq!(extract_final_answer("some text\n42"), "42");
    }

    #[test]
    fn test_reasoning_text_beats_bare_answer() {
        let reasoned = ReasoningLogicEvaluator
            .score(
                "Because speed equals distance divided by time, 60 / 1.5 = 40. \
                 Thus the answer is 40.",
                &case("40"),
            )
            .unwrap();
        let bare = ReasoningLogicEvaluator.score("40", &case("40")).unwrap();
        assert!(reasoned.value > bare.value);
    }
}
