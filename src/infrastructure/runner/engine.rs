//! Evaluation runner - orchestrates the (provider x test case) matrix

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::domain::cache::{Fingerprint, ResultCache};
use crate::domain::error::{BenchmarkError, ErrorKind, ProviderError};
use crate::domain::evaluator::{EvaluatorRegistry, Score};
use crate::domain::model::{Generation, GenerationParams, ModelProvider, ProviderIdentity};
use crate::domain::outcome::RawOutcome;
use crate::domain::test_case::TestCase;

use super::config::{RetryConfig, RunnerConfig};

/// Called after each completed outcome with `(completed, total)`
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// One provider under evaluation, paired with its generation parameters
#[derive(Debug, Clone)]
pub struct EvaluationTarget {
    pub provider: Arc<dyn ModelProvider>,
    pub params: GenerationParams,
}

impl EvaluationTarget {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

/// Orchestrates concurrent evaluation of every (provider, test case) pair.
///
/// Failure-isolated per task: a run always returns one outcome per scheduled
/// task, with provider failures demoted to error outcomes rather than
/// aborting the batch. Only invalid input fails the call itself.
pub struct EvaluationRunner {
    config: RunnerConfig,
    cache: Arc<dyn ResultCache>,
    registry: Arc<EvaluatorRegistry>,
    progress: Option<ProgressCallback>,
    cancelled: Arc<AtomicBool>,
}

impl EvaluationRunner {
    pub fn new(
        config: RunnerConfig,
        cache: Arc<dyn ResultCache>,
        registry: Arc<EvaluatorRegistry>,
    ) -> Self {
        Self {
            config,
            cache,
            registry,
            progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Handle for requesting cancellation of an in-flight run.
    ///
    /// Once set, no new generation task is admitted; tasks already past
    /// admission finish and their outcomes are returned as partial results.
    pub fn cancellation_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Evaluate every test case against every target.
    ///
    /// Outcomes are returned in completion order; no ordering is promised
    /// across (provider, test case) pairs.
    pub async fn run(
        &self,
        targets: &[EvaluationTarget],
        test_cases: &[TestCase],
    ) -> Result<Vec<RawOutcome>, BenchmarkError> {
        if targets.is_empty() {
            return Err(BenchmarkError::invalid_input("provider list is empty"));
        }
        if test_cases.is_empty() {
            return Err(BenchmarkError::invalid_input("test case list is empty"));
        }
        if self.config.max_concurrent == 0 {
            return Err(BenchmarkError::invalid_input(
                "max_concurrent must be positive",
            ));
        }

        let total = targets.len() * test_cases.len();
        let started = Instant::now();
        info!(
            providers = targets.len(),
            test_cases = test_cases.len(),
            total,
            max_concurrent = self.config.max_concurrent,
            "Starting benchmark run"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));
        let completed = Arc::new(AtomicUsize::new(0));
        // Flips on the first CacheError; the rest of the run skips the cache.
        let cache_degraded = Arc::new(AtomicBool::new(false));

        let mut outcomes = Vec::with_capacity(total);
        let mut join_set = JoinSet::new();

        for target in targets {
            let identity = target.provider.identity();

            if !target.provider.is_available().await {
                warn!(
                    model = %identity.model_name,
                    "Provider unavailable, recording failures for all its test cases"
                );
                for case in test_cases {
                    outcomes.push(RawOutcome::failure(
                        identity.clone(),
                        case,
                        ErrorKind::Unavailable,
                    ));
                    report_progress(&self.progress, &completed, total);
                }
                continue;
            }

            for case in test_cases {
                let ctx = TaskContext {
                    provider: Arc::clone(&target.provider),
                    params: target.params.clone(),
                    case: case.clone(),
                    cache: Arc::clone(&self.cache),
                    registry: Arc::clone(&self.registry),
                    retry: self.config.retry.clone(),
                    call_timeout: self.config.call_timeout,
                    cache_ttl: self.config.cache_ttl,
                    cache_enabled: self.config.cache_enabled,
                    cache_degraded: Arc::clone(&cache_degraded),
                    semaphore: Arc::clone(&semaphore),
                    cancelled: Arc::clone(&self.cancelled),
                    completed: Arc::clone(&completed),
                    total,
                    progress: self.progress.clone(),
                };
                join_set.spawn(evaluate_one(ctx));
            }
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Some(outcome)) => outcomes.push(outcome),
                // Cancelled before admission; dropped without an outcome.
                Ok(None) => {}
                Err(e) => error!(error = %e, "Evaluation task did not complete"),
            }
        }

        info!(
            outcomes = outcomes.len(),
            duration_seconds = started.elapsed().as_secs_f64(),
            "Benchmark run finished"
        );
        Ok(outcomes)
    }
}

/// Everything one evaluation task needs, owned so it can move into the task
struct TaskContext {
    provider: Arc<dyn ModelProvider>,
    params: GenerationParams,
    case: TestCase,
    cache: Arc<dyn ResultCache>,
    registry: Arc<EvaluatorRegistry>,
    retry: RetryConfig,
    call_timeout: Duration,
    cache_ttl: Duration,
    cache_enabled: bool,
    cache_degraded: Arc<AtomicBool>,
    semaphore: Arc<Semaphore>,
    cancelled: Arc<AtomicBool>,
    completed: Arc<AtomicUsize>,
    total: usize,
    progress: Option<ProgressCallback>,
}

impl TaskContext {
    fn cache_active(&self) -> bool {
        self.cache_enabled && !self.cache_degraded.load(Ordering::SeqCst)
    }

    fn degrade_cache(&self, error: impl std::fmt::Display) {
        warn!(
            error = %error,
            "Cache storage failed, continuing without cache for the rest of the run"
        );
        self.cache_degraded.store(true, Ordering::SeqCst);
    }
}

/// Evaluate one (provider, test case) pair.
///
/// Returns `None` only when the task was cancelled before admission.
async fn evaluate_one(ctx: TaskContext) -> Option<RawOutcome> {
    let identity = ctx.provider.identity();
    let fingerprint = Fingerprint::compute(&identity, &ctx.case.id, &ctx.params);

    if ctx.cache_active() {
        match ctx.cache.get(&fingerprint).await {
            Ok(Some(stored)) => {
                debug!(
                    model = %identity.model_name,
                    test = %ctx.case.id,
                    "Cache hit"
                );
                report_progress(&ctx.progress, &ctx.completed, ctx.total);
                return Some(stored.into_cache_hit());
            }
            Ok(None) => {}
            Err(e) => ctx.degrade_cache(e),
        }
    }

    let permit = match Arc::clone(&ctx.semaphore).acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => return None,
    };
    // Admission point: tasks queued on the semaphore must not start a
    // generation once cancellation is requested.
    if ctx.cancelled.load(Ordering::SeqCst) {
        return None;
    }

    let generated = generate_with_retry(&ctx, &identity).await;
    // Scoring and cache writes are cheap; release the generation slot first.
    drop(permit);

    let outcome = match generated {
        Ok((generation, latency_seconds)) => {
            score_generation(&ctx, identity, generation, latency_seconds)
        }
        Err(error) => {
            warn!(
                model = %identity.model_name,
                test = %ctx.case.id,
                error = %error,
                "Generation failed terminally"
            );
            RawOutcome::failure(identity, &ctx.case, error.kind())
        }
    };

    if !outcome.is_error() && ctx.cache_active() {
        if let Err(e) = ctx.cache.put(&fingerprint, &outcome, ctx.cache_ttl).await {
            ctx.degrade_cache(e);
        }
    }

    report_progress(&ctx.progress, &ctx.completed, ctx.total);
    Some(outcome)
}

/// Call the provider with per-call timeout and bounded retry.
///
/// Only transient errors (rate limit, timeout) are retried; anything else is
/// terminal on the first occurrence.
async fn generate_with_retry(
    ctx: &TaskContext,
    identity: &ProviderIdentity,
) -> Result<(Generation, f64), ProviderError> {
    let max_attempts = ctx.retry.max_retries + 1;
    let mut last_error = ProviderError::unavailable("no generation attempt was made");

    for attempt in 0..max_attempts {
        if attempt > 0 {
            tokio::time::sleep(ctx.retry.jittered_delay_for_attempt(attempt - 1)).await;
        }

        let start = Instant::now();
        let call = ctx.provider.generate(
            &ctx.case.prompt,
            ctx.case.system_prompt.as_deref(),
            &ctx.params,
        );
        let result = match timeout(ctx.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::timeout(format!(
                "call exceeded {}ms",
                ctx.call_timeout.as_millis()
            ))),
        };

        match result {
            Ok(generation) => return Ok((generation, start.elapsed().as_secs_f64())),
            Err(error) if error.is_transient() && attempt + 1 < max_attempts => {
                debug!(
                    model = %identity.model_name,
                    test = %ctx.case.id,
                    attempt = attempt + 1,
                    error = %error,
                    "Transient provider error, retrying"
                );
                last_error = error;
            }
            Err(error) => return Err(error),
        }
    }

    Err(last_error)
}

/// Score a completed generation. Evaluator faults demote to score 0 rather
/// than failing the task.
fn score_generation(
    ctx: &TaskContext,
    identity: ProviderIdentity,
    generation: Generation,
    latency_seconds: f64,
) -> RawOutcome {
    let score = ctx
        .registry
        .get(ctx.case.category)
        .and_then(|evaluator| evaluator.score(&generation.text, &ctx.case))
        .unwrap_or_else(|e| {
            warn!(
                test = %ctx.case.id,
                category = %ctx.case.category,
                error = %e,
                "Evaluator fault, scoring 0"
            );
            Score::zero()
        });

    let cost_usd = identity.cost_usd(&generation.usage);
    RawOutcome::success(
        identity,
        &ctx.case,
        generation.text,
        score.value,
        score.passed,
        latency_seconds,
        cost_usd,
        generation.usage,
    )
}

fn report_progress(progress: &Option<ProgressCallback>, completed: &AtomicUsize, total: usize) {
    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
    if let Some(callback) = progress {
        callback(done, total);
    }
}
