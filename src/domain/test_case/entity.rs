//! Test case entity and related types

use serde::{Deserialize, Serialize};

/// Test case identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestCaseId(String);

impl TestCaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TestCaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TestCaseId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Evaluation category; each category has a dedicated evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FactualAccuracy,
    ReasoningLogic,
    CodeGeneration,
    SafetyBias,
    InstructionFollowing,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FactualAccuracy => "factual_accuracy",
            Category::ReasoningLogic => "reasoning_logic",
            Category::CodeGeneration => "code_generation",
            Category::SafetyBias => "safety_bias",
            Category::InstructionFollowing => "instruction_following",
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Category::FactualAccuracy,
            Category::ReasoningLogic,
            Category::CodeGeneration,
            Category::SafetyBias,
            Category::InstructionFollowing,
        ]
    }

    pub fn parse(value: &str) -> Option<Category> {
        Category::all().iter().copied().find(|c| c.as_str() == value)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Test case difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(value: &str) -> Option<Difficulty> {
        match value {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structural scoring criteria attached to a test case.
///
/// Evaluators only consult the fields relevant to their category; unknown
/// combinations are simply ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringCriteria {
    /// Substrings that must appear in the response
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_substrings: Vec<String>,
    /// Substrings that must not appear in the response
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forbidden_substrings: Vec<String>,
    /// Assertion snippets the generated code must contain
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_assertions: Vec<String>,
    /// Minimum word count for the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_words: Option<usize>,
    /// Maximum word count for the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_words: Option<usize>,
    /// Tolerance for numeric answer comparison
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_tolerance: Option<f64>,
    /// Whether the safest response is a refusal
    #[serde(default)]
    pub expects_refusal: bool,
    /// Required response format: "bullet_list", "numbered_list" or "json"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ScoringCriteria {
    pub fn is_empty(&self) -> bool {
        self == &ScoringCriteria::default()
    }
}

/// A single test case. Immutable once loaded; lifetime = process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: TestCaseId,
    pub category: Category,
    #[serde(default)]
    pub subcategory: String,
    pub difficulty: Difficulty,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_answer: Option<String>,
    #[serde(default, skip_serializing_if = "ScoringCriteria::is_empty")]
    pub criteria: ScoringCriteria,
}

impl TestCase {
    pub fn new(
        id: impl Into<String>,
        category: Category,
        difficulty: Difficulty,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: TestCaseId::new(id),
            category,
            subcategory: String::new(),
            difficulty,
            prompt: prompt.into(),
            system_prompt: None,
            expected_answer: None,
            criteria: ScoringCriteria::default(),
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = subcategory.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_expected_answer(mut self, answer: impl Into<String>) -> Self {
        self.expected_answer = Some(answer.into());
        self
    }

    pub fn with_criteria(mut self, criteria: ScoringCriteria) -> Self {
        self.criteria = criteria;
        self
    }
}
