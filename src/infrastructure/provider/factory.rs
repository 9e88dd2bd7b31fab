//! Provider construction from configuration

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::anthropic::AnthropicProvider;
use super::http_client::HttpClient;
use super::ollama::OllamaProvider;
use super::openai::OpenAiProvider;
use crate::domain::error::BenchmarkError;
use crate::domain::model::{ModelProvider, ProviderConfig, ProviderKind};

const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Per-1K USD pricing, matched by substring of the lowercased model name.
/// Applied only when the configuration leaves both rates at zero.
const DEFAULT_PRICING: &[(&str, f64, f64)] = &[
    ("gpt-4o", 0.005, 0.015),
    ("gpt-4-turbo", 0.01, 0.03),
    ("gpt-4", 0.03, 0.06),
    ("gpt-3.5-turbo-16k", 0.003, 0.004),
    ("gpt-3.5-turbo", 0.0015, 0.002),
    ("claude-3-opus", 0.015, 0.075),
    ("claude-3-sonnet", 0.003, 0.015),
    ("claude-3-haiku", 0.00025, 0.00125),
    ("claude-2", 0.008, 0.024),
];

fn with_default_pricing(mut config: ProviderConfig) -> ProviderConfig {
    if config.cost_per_input_token != 0.0 || config.cost_per_output_token != 0.0 {
        return config;
    }

    let model = config.model_name.to_lowercase();
    for (key, input, output) in DEFAULT_PRICING {
        if model.contains(key) {
            debug!(model = %config.model_name, input, output, "Applying default pricing");
            config.cost_per_input_token = *input;
            config.cost_per_output_token = *output;
            break;
        }
    }
    config
}

/// Builds concrete providers from configuration.
///
/// API keys come from the environment, never from configuration files.
#[derive(Debug, Clone)]
pub struct ProviderFactory {
    call_timeout: Duration,
}

impl ProviderFactory {
    pub fn new(call_timeout: Duration) -> Self {
        Self { call_timeout }
    }

    pub fn build(&self, config: &ProviderConfig) -> Result<Arc<dyn ModelProvider>, BenchmarkError> {
        if config.model_name.trim().is_empty() {
            return Err(BenchmarkError::configuration("model_name is empty"));
        }

        let client = HttpClient::with_timeout(self.call_timeout)
            .map_err(|e| BenchmarkError::configuration(e.to_string()))?;
        let config = with_default_pricing(config.clone());

        let provider: Arc<dyn ModelProvider> = match config.kind {
            ProviderKind::OpenAi => {
                let api_key = std::env::var(OPENAI_API_KEY_VAR).unwrap_or_default();
                Arc::new(OpenAiProvider::new(client, api_key, &config))
            }
            ProviderKind::Anthropic => {
                let api_key = std::env::var(ANTHROPIC_API_KEY_VAR).unwrap_or_default();
                Arc::new(AnthropicProvider::new(client, api_key, &config))
            }
            ProviderKind::Local => Arc::new(OllamaProvider::new(client, &config)),
        };

        Ok(provider)
    }

    pub fn build_all(
        &self,
        configs: &[ProviderConfig],
    ) -> Result<Vec<Arc<dyn ModelProvider>>, BenchmarkError> {
        configs.iter().map(|config| self.build(config)).collect()
    }
}
