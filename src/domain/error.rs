use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a provider failure, recorded on outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RateLimited,
    Timeout,
    AuthFailure,
    Unavailable,
    Malformed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::RateLimited => write!(f, "rate_limited"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::AuthFailure => write!(f, "auth_failure"),
            ErrorKind::Unavailable => write!(f, "unavailable"),
            ErrorKind::Malformed => write!(f, "malformed"),
        }
    }
}

/// Error returned by a model provider call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed request or response: {0}")]
    Malformed(String),
}

impl ProviderError {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited(message.into())
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    pub fn auth_failure(message: impl Into<String>) -> Self {
        Self::AuthFailure(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::AuthFailure(_) => ErrorKind::AuthFailure,
            Self::Unavailable(_) => ErrorKind::Unavailable,
            Self::Malformed(_) => ErrorKind::Malformed,
        }
    }

    /// Transient failures are retried; everything else is terminal.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Timeout(_))
    }
}

/// Error from the result cache storage layer
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("Cache storage error: {0}")]
    Storage(String),
}

impl CacheError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

/// Error from an evaluator's scoring logic
#[derive(Debug, Clone, Error)]
pub enum EvaluatorError {
    #[error("No evaluator registered for category '{0}'")]
    UnknownCategory(String),

    #[error("Scoring error: {0}")]
    Scoring(String),
}

impl EvaluatorError {
    pub fn scoring(message: impl Into<String>) -> Self {
        Self::Scoring(message.into())
    }
}

/// Top-level errors surfaced by the benchmark engine
#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BenchmarkError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
