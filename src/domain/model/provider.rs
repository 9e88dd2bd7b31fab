use std::fmt::Debug;

use async_trait::async_trait;

use super::{Generation, GenerationParams, ProviderIdentity};
use crate::domain::error::ProviderError;

/// Trait for model providers (OpenAI, Anthropic, local backends).
///
/// The runner depends only on this contract, never on a concrete vendor
/// client. Calls are assumed independent and safe to retry; a retried call
/// may bill twice, which cost aggregation simply sums.
#[async_trait]
pub trait ModelProvider: Send + Sync + Debug {
    /// Generate a completion for the given prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        params: &GenerationParams,
    ) -> Result<Generation, ProviderError>;

    /// Cheap liveness probe, called once before a batch starts
    async fn is_available(&self) -> bool;

    /// Identity and cost metadata, used for fingerprinting and billing
    fn identity(&self) -> ProviderIdentity;
}

#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::domain::model::{ProviderKind, TokenUsage};

    /// Deterministic provider double with call-count and in-flight probes.
    #[derive(Debug)]
    pub struct MockModelProvider {
        identity: ProviderIdentity,
        available: bool,
        response_text: String,
        usage: TokenUsage,
        delay: Duration,
        /// Errors returned (in order) before calls start succeeding
        queued_failures: Mutex<VecDeque<ProviderError>>,
        /// When set, every call fails with this error
        permanent_failure: Option<ProviderError>,
        call_count: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockModelProvider {
        pub fn new(model_name: &str) -> Self {
            Self {
                identity: ProviderIdentity::new(model_name, ProviderKind::Local, 0.0, 0.0),
                available: true,
                response_text: "mock response".to_string(),
                usage: TokenUsage::new(10, 10),
                delay: Duration::ZERO,
                queued_failures: Mutex::new(VecDeque::new()),
                permanent_failure: None,
                call_count: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        pub fn with_kind(mut self, kind: ProviderKind) -> Self {
            self.identity.kind = kind;
            self
        }

        pub fn with_cost_rates(mut self, input_per_1k: f64, output_per_1k: f64) -> Self {
            self.identity.cost_per_input_token = input_per_1k;
            self.identity.cost_per_output_token = output_per_1k;
            self
        }

        pub fn with_response(mut self, text: impl Into<String>) -> Self {
            self.response_text = text.into();
            self
        }

        pub fn with_usage(mut self, usage: TokenUsage) -> Self {
            self.usage = usage;
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn unavailable(mut self) -> Self {
            self.available = false;
            self
        }

        pub fn always_failing(mut self, error: ProviderError) -> Self {
            self.permanent_failure = Some(error);
            self
        }

        /// The next `count` calls fail with clones of `error`, then succeed
        pub fn with_transient_failures(self, error: ProviderError, count: usize) -> Self {
            {
                let mut queue = self.queued_failures.lock().unwrap();
                for _ in 0..count {
                    queue.push_back(error.clone());
                }
            }
            self
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Highest number of concurrently in-flight generate calls observed
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelProvider for MockModelProvider {
        async fn generate(
            &self,
            _prompt: &str,
            _system_prompt: Option<&str>,
            _params: &GenerationParams,
        ) -> Result<Generation, ProviderError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let result = if let Some(ref error) = self.permanent_failure {
                Err(error.clone())
            } else if let Some(error) = self.queued_failures.lock().unwrap().pop_front() {
                Err(error)
            } else {
                Ok(Generation::new(
                    self.response_text.clone(),
                    self.delay,
                    self.usage,
                ))
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }

        async fn is_available(&self) -> bool {
            self.available
        }

        fn identity(&self) -> ProviderIdentity {
            self.identity.clone()
        }
    }
}
