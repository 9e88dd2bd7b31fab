//! Code generation evaluator
//!
//! Static, bounded checks only: real sandboxed execution lives behind an
//! external collaborator. A response that contains no code scores 0 instead
//! of erroring, so one bad generation never aborts a batch.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::error::EvaluatorError;
use crate::domain::evaluator::{Evaluator, Score};
use crate::domain::test_case::TestCase;

static CODE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[a-zA-Z0-9_]*\n?(.*?)```").unwrap());

static DEFINITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:def |fn |function |class |pub fn |async def )").unwrap()
});

/// Scores extracted code for structure and required assertions.
///
/// Weighted blend: syntax shape 0.30, required assertions 0.35, code quality
/// 0.20, documentation 0.15.
#[derive(Debug)]
pub struct CodeGenerationEvaluator;

impl Evaluator for CodeGenerationEvaluator {
    fn name(&self) -> &'static str {
        "code_generation"
    }

    fn score(&self, response_text: &str, case: &TestCase) -> Result<Score, EvaluatorError> {
        let Some(code) = extract_code(response_text) else {
            return Ok(Score::zero());
        };

        let syntax = syntax_shape(&code);
        let assertions = required_assertions(&code, &case.criteria.required_assertions);
        let quality = code_quality(&code);
        let documentation = documentation(&code);

        let value = syntax * 0.30 + assertions * 0.35 + quality * 0.20 + documentation * 0.15;

        Ok(Score::from_value(value))
    }
}

/// The first fenced code block, or the whole text if it looks like bare code
fn extract_code(text: &str) -> Option<String> {
    if let Some(captures) = CODE_BLOCK_RE.captures(text) {
        let code = captures.get(1)?.as_str().trim();
        if !code.is_empty() {
            return Some(code.to_string());
        }
    }

    if DEFINITION_RE.is_match(text) {
        return Some(text.trim().to_string());
    }

    None
}

/// Cheap structural validity: a definition exists and delimiters are balanced
fn syntax_shape(code: &str) -> f64 {
    let mut value: f64 = 0.0;

    if DEFINITION_RE.is_match(code) {
        value += 0.5;
    }
    if balanced(code, '(', ')') && balanced(code, '[', ']') && balanced(code, '{', '}') {
        value += 0.5;
    }

    value
}

fn balanced(code: &str, open: char, close: char) -> bool {
    let mut depth: i64 = 0;
    for c in code.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth < 0 {
                return false;
            }
        }
    }
    depth == 0
}

/// Fraction of required assertion snippets present in the code
fn required_assertions(code: &str, required: &[String]) -> f64 {
    if required.is_empty() {
        return 1.0;
    }

    let lower = code.to_lowercase();
    let found = required
        .iter()
        .filter(|snippet| lower.contains(&snippet.to_lowercase()))
        .count();

    found as f64 / required.len() as f64
}

fn code_quality(code: &str) -> f64 {
    let mut value: f64 = 0.0;
    let lines: Vec<&str> = code.lines().collect();

    // Non-trivial but not a wall of text
    if lines.len() >= 2 && lines.len() <= 200 {
        value += 0.4;
    }
    // Uses named values rather than a single expression
    if code.contains('=') || code.contains("let ") {
        value += 0.3;
    }
    // Returns or prints something
    if code.contains("return") || code.contains("print") || code.contains("->") {
        value += 0.3;
    }

    value.min(1.0)
}

fn documentation(code: &str) -> f64 {
    let has_comment = code.lines().any(|line| {
        let trimmed = line.trim_start();
        trimmed.starts_with('#') || trimmed.starts_with("//") || trimmed.starts_with("\"\"\"")
    });
    let has_docstring = code.contains("\"\"\"") || code.contains("///");

    match (has_comment, has_docstring) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.6,
        (false, false) => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_case::{Category, Difficulty, ScoringCriteria};

    fn case(assertions: &[&str]) -> TestCase {
        TestCase::new(
            "cg-001",
            Category::CodeGeneration,
            Difficulty::Medium,
            "Write a Python function that reverses a string.",
        )
        .with_criteria(ScoringCriteria {
            required_assertions: assertions.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    #[test]
    fn test_good_solution_passes() {
        let response = "Here you go:\n```python\n# Reverse a string\ndef reverse(s):\n    \
            result = s[::-1]\n    return result\n```";

        let score = CodeGenerationEvaluator
            .score(response, &case(&["def reverse", "return"]))
            .unwrap();
        assert!(score.passed, "score was {}", score.value);
    }

    #[test]
    fn test_no_code_scores_zero() {
        let score = CodeGenerationEvaluator
            .score("Sorry, I can only describe the approach in prose.", &case(&[]))
            .unwrap();
        assert_eq!(score.value, 0.0);
        assert!(!score.passed);
    }

    #[test]
    fn test_missing_assertions_penalized() {
        let response = "```python\ndef f(x):\n    return x\n```";
        let with_missing = CodeGenerationEvaluator
            .score(response, &case(&["sorted(", "len("]))
            .unwrap();
        let with_present = CodeGenerationEvaluator
            .score(response, &case(&["return"]))
            .unwrap();
        assert!(with_present.value > with_missing.value);
    }

    #[test]
    fn test_unbalanced_delimiters_penalized() {
        let balanced_code = "```\ndef f(x):\n    return (x + 1)\n```";
        let unbalanced_code = "```\ndef f(x:\n    return (x + 1\n```";

        let good = CodeGenerationEvaluator
            .score(balanced_code, &case(&[]))
            .unwrap();
        let bad = CodeGenerationEvaluator
            .score(unbalanced_code, &case(&[]))
            .unwrap();
        assert!(good.value > bad.value);
    }

    #[test]
    fn test_bare_code_without_fence_is_extracted() {
        let response = "def add(a, b):\n    return a + b";
        let score = CodeGenerationEvaluator.score(response, &case(&[])).unwrap();
        assert!(score.value > 0.0);
    }
}
