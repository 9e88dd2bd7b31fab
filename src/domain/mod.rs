//! Domain layer - core entities and contracts

pub mod cache;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod outcome;
pub mod report;
pub mod test_case;

pub use cache::{Fingerprint, ResultCache};
pub use error::{BenchmarkError, CacheError, ErrorKind, EvaluatorError, ProviderError};
pub use evaluator::{Evaluator, EvaluatorRegistry, Score, PASS_THRESHOLD};
pub use model::{
    Generation, GenerationParams, ModelProvider, ProviderConfig, ProviderIdentity, ProviderKind,
    TokenUsage,
};
pub use outcome::RawOutcome;
pub use report::{
    AggregateStats, BenchmarkReport, ProviderComparison, ProviderRanking, RunMetadata,
};
pub use test_case::{Category, Difficulty, ScoringCriteria, TestCase, TestCaseId};
