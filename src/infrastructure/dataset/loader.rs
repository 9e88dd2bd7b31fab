//! Test case loading and filtering

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use tracing::info;

use crate::domain::error::BenchmarkError;
use crate::domain::test_case::{Category, Difficulty, TestCase};

/// Filter applied when loading a dataset. Empty sets mean "no filter".
#[derive(Debug, Clone, Default)]
pub struct DatasetFilter {
    pub categories: HashSet<Category>,
    pub difficulties: HashSet<Difficulty>,
    /// Cap per category, preserving dataset order. `None` keeps everything.
    pub max_cases_per_category: Option<usize>,
}

impl DatasetFilter {
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn with_difficulties(mut self, difficulties: impl IntoIterator<Item = Difficulty>) -> Self {
        self.difficulties = difficulties.into_iter().collect();
        self
    }

    pub fn with_max_cases_per_category(mut self, cap: usize) -> Self {
        self.max_cases_per_category = Some(cap);
        self
    }

    fn matches(&self, case: &TestCase) -> bool {
        (self.categories.is_empty() || self.categories.contains(&case.category))
            && (self.difficulties.is_empty() || self.difficulties.contains(&case.difficulty))
    }
}

/// Loads test cases from JSON files. Read-only after load.
#[derive(Debug, Clone, Default)]
pub struct DatasetLoader {
    cases: Vec<TestCase>,
}

impl DatasetLoader {
    pub fn from_cases(cases: Vec<TestCase>) -> Self {
        Self { cases }
    }

    /// Load a JSON array of test cases from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BenchmarkError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BenchmarkError::dataset(format!("Failed to read {}: {e}", path.display()))
        })?;

        let cases: Vec<TestCase> = serde_json::from_str(&raw).map_err(|e| {
            BenchmarkError::dataset(format!("Failed to parse {}: {e}", path.display()))
        })?;

        info!(path = %path.display(), cases = cases.len(), "Loaded dataset");
        Ok(Self { cases })
    }

    pub fn all(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Apply category/difficulty filters and the per-category cap.
    ///
    /// Dataset order is preserved; the cap keeps the first N cases of each
    /// category as they appear in the file.
    pub fn filtered(&self, filter: &DatasetFilter) -> Vec<TestCase> {
        let mut kept_per_category: BTreeMap<Category, usize> = BTreeMap::new();
        let mut selected = Vec::new();

        for case in &self.cases {
            if !filter.matches(case) {
                continue;
            }
            if let Some(cap) = filter.max_cases_per_category {
                let kept = kept_per_category.entry(case.category).or_insert(0);
                if *kept >= cap {
                    continue;
                }
                *kept += 1;
            }
            selected.push(case.clone());
        }

        selected
    }

    pub fn group_by_category(&self) -> BTreeMap<Category, Vec<TestCase>> {
        let mut groups: BTreeMap<Category, Vec<TestCase>> = BTreeMap::new();
        for case in &self.cases {
            groups.entry(case.category).or_default().push(case.clone());
        }
        groups
    }
}
