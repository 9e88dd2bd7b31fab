//! Run command - evaluates providers against a dataset and reports results

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::cache::ResultCache;
use crate::domain::model::ProviderConfig;
use crate::infrastructure::cache::{InMemoryResultCache, NoopResultCache};
use crate::infrastructure::dataset::DatasetLoader;
use crate::infrastructure::evaluators::builtin_registry;
use crate::infrastructure::logging;
use crate::infrastructure::metrics::MetricsEngine;
use crate::infrastructure::provider::ProviderFactory;
use crate::infrastructure::runner::{EvaluationRunner, EvaluationTarget};

#[derive(Args)]
pub struct RunArgs {
    /// Path to the test case dataset (JSON array of test cases)
    #[arg(long)]
    pub dataset: PathBuf,

    /// Path to the provider configuration file (JSON array)
    #[arg(long)]
    pub providers: PathBuf,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Only run these categories (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Only run these difficulties (repeatable)
    #[arg(long = "difficulty")]
    pub difficulties: Vec<String>,

    /// Cap the number of cases per category
    #[arg(long)]
    pub max_cases_per_category: Option<usize>,

    /// Override the configured concurrency ceiling
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Disable the result cache for this run
    #[arg(long)]
    pub no_cache: bool,
}

pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = merge_args(AppConfig::load().unwrap_or_default(), &args);
    init_logging(&config);
    config.validate()?;

    let loader = DatasetLoader::from_file(&args.dataset)?;
    let test_cases = loader.filtered(&config.dataset_filter()?);
    info!(
        loaded = loader.len(),
        selected = test_cases.len(),
        "Dataset ready"
    );

    let provider_configs = load_provider_configs(&args.providers)?;
    let runner_config = config.runner_config();
    let factory = ProviderFactory::new(runner_config.call_timeout);

    let mut targets = Vec::with_capacity(provider_configs.len());
    for provider_config in &provider_configs {
        let provider = factory.build(provider_config)?;
        targets.push(EvaluationTarget::new(provider).with_params(provider_config.params.clone()));
    }

    let runner = EvaluationRunner::new(
        runner_config,
        build_cache(&config),
        Arc::new(builtin_registry()),
    )
    .with_progress(Arc::new(|done, total| {
        info!(done, total, "Progress");
    }));

    let started = Instant::now();
    let outcomes = runner.run(&targets, &test_cases).await?;
    let duration_seconds = started.elapsed().as_secs_f64();

    let report = MetricsEngine::new().build_report(outcomes, test_cases.len(), duration_seconds);
    let json = serde_json::to_string_pretty(&report)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn build_cache(config: &AppConfig) -> Arc<dyn ResultCache> {
    if config.cache.enabled {
        Arc::new(InMemoryResultCache::new())
    } else {
        Arc::new(NoopResultCache)
    }
}

fn merge_args(mut config: AppConfig, args: &RunArgs) -> AppConfig {
    if !args.categories.is_empty() {
        config.dataset.categories = args.categories.clone();
    }
    if !args.difficulties.is_empty() {
        config.dataset.difficulties = args.difficulties.clone();
    }
    if args.max_cases_per_category.is_some() {
        config.dataset.max_cases_per_category = args.max_cases_per_category;
    }
    if let Some(max_concurrent) = args.max_concurrent {
        config.runner.max_concurrent = max_concurrent;
    }
    if args.no_cache {
        config.cache.enabled = false;
    }
    config
}

fn load_provider_configs(path: &PathBuf) -> anyhow::Result<Vec<ProviderConfig>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read provider config {}", path.display()))?;
    let configs: Vec<ProviderConfig> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse provider config {}", path.display()))?;
    Ok(configs)
}

fn init_logging(config: &AppConfig) {
    logging::init_logging(&logging::LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });
}
