use serde::{Deserialize, Serialize};

/// Provider backend family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Local,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Local => "local",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generation parameters sent with every provider call.
///
/// These are part of the cache fingerprint: any field that can change the
/// model's output must live here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl GenerationParams {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// Configuration for one benchmarked provider.
///
/// Supplied by configuration, immutable after construction. Cost rates are
/// USD per 1K tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub model_name: String,
    pub kind: ProviderKind,
    #[serde(default)]
    pub params: GenerationParams,
    #[serde(default)]
    pub cost_per_input_token: f64,
    #[serde(default)]
    pub cost_per_output_token: f64,
    /// Base URL override, mainly for local backends and tests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(model_name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            model_name: model_name.into(),
            kind,
            params: GenerationParams::default(),
            cost_per_input_token: 0.0,
            cost_per_output_token: 0.0,
            base_url: None,
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_cost_rates(mut self, input_per_1k: f64, output_per_1k: f64) -> Self {
        self.cost_per_input_token = input_per_1k;
        self.cost_per_output_token = output_per_1k;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = GenerationParams::default();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.max_tokens, 1000);
    }

    #[test]
    fn test_provider_config_builder() {
        let config = ProviderConfig::new("gpt-4o", ProviderKind::OpenAi)
            .with_cost_rates(0.005, 0.015)
            .with_params(GenerationParams::new(0.0, 256));

        assert_eq!(config.model_name, "gpt-4o");
        assert_eq!(config.params.max_tokens, 256);
        assert_eq!(config.cost_per_input_token, 0.005);
    }

    #[test]
    fn test_provider_config_deserialize_defaults() {
        let json = r#"{ "model_name": "llama3", "kind": "local" }"#;
        let config: ProviderConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.kind, ProviderKind::Local);
        assert_eq!(config.params, GenerationParams::default());
        assert_eq!(config.cost_per_input_token, 0.0);
    }
}
