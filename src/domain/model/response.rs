use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ProviderKind;

/// Token usage statistics for one generation call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A successful generation returned by a provider
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub latency: Duration,
    pub usage: TokenUsage,
}

impl Generation {
    pub fn new(text: impl Into<String>, latency: Duration, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            latency,
            usage,
        }
    }
}

/// Identity and billing metadata for a provider instance.
///
/// Used for cache fingerprinting and cost computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub model_name: String,
    pub kind: ProviderKind,
    /// USD per 1K input tokens
    pub cost_per_input_token: f64,
    /// USD per 1K output tokens
    pub cost_per_output_token: f64,
}

impl ProviderIdentity {
    pub fn new(
        model_name: impl Into<String>,
        kind: ProviderKind,
        cost_per_input_token: f64,
        cost_per_output_token: f64,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            kind,
            cost_per_input_token,
            cost_per_output_token,
        }
    }

    /// Label distinguishing the same model served through different backends
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.model_name, self.kind)
    }

    /// Cost of one call in USD given its token usage
    pub fn cost_usd(&self, usage: &TokenUsage) -> f64 {
        let input = usage.prompt_tokens as f64 * self.cost_per_input_token / 1000.0;
        let output = usage.completion_tokens as f64 * self.cost_per_output_token / 1000.0;
        input + output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_tokens() {
        let usage = TokenUsage::new(10, 20);
        assert_eq!(usage.total_tokens(), 30);
    }

    #[test]
    fn test_cost_computation() {
        let identity = ProviderIdentity::new("gpt-4o", ProviderKind::OpenAi, 0.005, 0.015);
        let usage = TokenUsage::new(1000, 2000);

        let cost = identity.cost_usd(&usage);
        assert!((cost - (0.005 + 2.0 * 0.015)).abs() < 1e-12);
    }

    #[test]
    fn test_display_name_carries_backend() {
        let identity = ProviderIdentity::new("llama3", ProviderKind::Local, 0.0, 0.0);
        assert_eq!(identity.display_name(), "llama3 (local)");
    }

    #[test]
    fn test_zero_rates_bill_nothing() {
        let identity = ProviderIdentity::new("llama3", ProviderKind::Local, 0.0, 0.0);
        assert_eq!(identity.cost_usd(&TokenUsage::new(500, 500)), 0.0);
    }
}
