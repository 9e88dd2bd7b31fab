use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::error::BenchmarkError;
use crate::domain::test_case::{Category, Difficulty};
use crate::infrastructure::dataset::DatasetFilter;
use crate::infrastructure::runner::{RetryConfig, RunnerConfig};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub runner: RunnerSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub dataset: DatasetSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSettings {
    pub max_concurrent: usize,
    pub retry_limit: u32,
    pub call_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_seconds: u64,
}

/// Dataset filters. Empty lists mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetSettings {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub difficulties: Vec<String>,
    #[serde(default)]
    pub max_cases_per_category: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            retry_limit: 3,
            call_timeout_seconds: 30,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 24 * 60 * 60,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), BenchmarkError> {
        if self.runner.max_concurrent == 0 {
            return Err(BenchmarkError::configuration(
                "runner.max_concurrent must be positive",
            ));
        }
        if self.runner.call_timeout_seconds == 0 {
            return Err(BenchmarkError::configuration(
                "runner.call_timeout_seconds must be positive",
            ));
        }
        if self.cache.ttl_seconds == 0 {
            return Err(BenchmarkError::configuration(
                "cache.ttl_seconds must be positive",
            ));
        }
        self.dataset_filter()?;
        Ok(())
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig::default()
            .with_max_concurrent(self.runner.max_concurrent)
            .with_cache_enabled(self.cache.enabled)
            .with_cache_ttl(Duration::from_secs(self.cache.ttl_seconds))
            .with_retry(RetryConfig::new(self.runner.retry_limit))
            .with_call_timeout(Duration::from_secs(self.runner.call_timeout_seconds))
    }

    pub fn dataset_filter(&self) -> Result<DatasetFilter, BenchmarkError> {
        let categories: HashSet<Category> = self
            .dataset
            .categories
            .iter()
            .map(|name| {
                Category::parse(name).ok_or_else(|| {
                    BenchmarkError::configuration(format!("Unknown category '{name}'"))
                })
            })
            .collect::<Result<_, _>>()?;

        let difficulties: HashSet<Difficulty> = self
            .dataset
            .difficulties
            .iter()
            .map(|name| {
                Difficulty::parse(name).ok_or_else(|| {
                    BenchmarkError::configuration(format!("Unknown difficulty '{name}'"))
                })
            })
            .collect::<Result<_, _>>()?;

        let mut filter = DatasetFilter::default()
            .with_categories(categories)
            .with_difficulties(difficulties);
        filter.max_cases_per_category = self.dataset.max_cases_per_category;
        Ok(filter)
    }
}
