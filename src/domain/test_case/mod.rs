//! Test case entities - the fixed battery a benchmark run evaluates

mod entity;

pub use entity::{Category, Difficulty, ScoringCriteria, TestCase, TestCaseId};
