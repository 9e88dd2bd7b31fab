use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::HttpClientTrait;
use crate::domain::error::ProviderError;
use crate::domain::model::{
    Generation, GenerationParams, ModelProvider, ProviderConfig, ProviderIdentity, ProviderKind,
    TokenUsage,
};

const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic messages API provider
#[derive(Debug)]
pub struct AnthropicProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
    identity: ProviderIdentity,
}

impl<C: HttpClientTrait> AnthropicProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, config: &ProviderConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            client,
            api_key: api_key.into(),
            base_url,
            identity: ProviderIdentity::new(
                &config.model_name,
                ProviderKind::Anthropic,
                config.cost_per_input_token,
                config.cost_per_output_token,
            ),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-api-key", self.api_key.as_str()),
            ("anthropic-version", ANTHROPIC_VERSION),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        params: &GenerationParams,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.identity.model_name,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
            "messages": [{"role": "user", "content": prompt}],
        });

        if let Some(system) = system_prompt {
            body["system"] = serde_json::json!(system);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<(String, TokenUsage), ProviderError> {
        let response: AnthropicResponse = serde_json::from_value(json)
            .map_err(|e| ProviderError::malformed(format!("Failed to parse response: {e}")))?;

        // Text blocks only; tool-use blocks have no place in benchmarking.
        let text: String = response
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if response.content.is_empty() {
            return Err(ProviderError::malformed("No content blocks in response"));
        }

        let usage = TokenUsage::new(response.usage.input_tokens, response.usage.output_tokens);
        Ok((text, usage))
    }
}

#[async_trait]
impl<C: HttpClientTrait> ModelProvider for AnthropicProvider<C> {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        params: &GenerationParams,
    ) -> Result<Generation, ProviderError> {
        let url = self.messages_url();
        let body = self.build_request(prompt, system_prompt, params);

        let start = Instant::now();
        let response = self.client.post_json(&url, self.headers(), &body).await?;
        let latency = start.elapsed();

        let (text, usage) = self.parse_response(response)?;
        Ok(Generation::new(text, latency, usage))
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn identity(&self) -> ProviderIdentity {
        self.identity.clone()
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::super::http_client::mock::MockHttpClient;
    use super::*;

    const URL: &str = "https://api.anthropic.com/v1/messages";

    fn config() -> ProviderConfig {
        ProviderConfig::new("claude-sonnet-4", ProviderKind::Anthropic).with_cost_rates(0.003, 0.015)
    }

    fn messages_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg-1",
            "model": "claude-sonnet-4",
            "content": [{"type": "text", "text": text}],
            "usage": {"input_tokens": 20, "output_tokens": 40}
        })
    }

    #[tokio::test]
    async fn test_generate_joins_text_blocks() {
        let response = serde_json::json!({
            "content": [
                {"type": "text", "text": "Hello "},
                {"type": "text", "text": "world"}
            ],
            "usage": {"input_tokens": 5, "output_tokens": 2}
        });
        let client = MockHttpClient::new().with_response(URL, response);
        let provider = AnthropicProvider::new(client, "sk-ant-test", &config());

        let generation = provider
            .generate("Say hello", None, &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(generation.text, "Hello world");
        assert_eq!(generation.usage, TokenUsage::new(5, 2));
    }

    #[tokio::test]
    async fn test_generate_parses_usage() {
        let client = MockHttpClient::new().with_response(URL, messages_response("Paris"));
        let provider = AnthropicProvider::new(client, "sk-ant-test", &config());

        let generation = provider
            .generate("Capital of France?", Some("Be terse"), &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(generation.text, "Paris");
        assert_eq!(generation.usage.total_tokens(), 60);
    }

    #[tokio::test]
    async fn test_empty_content_is_malformed() {
        let response = serde_json::json!({
            "content": [],
            "usage": {"input_tokens": 5, "output_tokens": 0}
        });
        let client = MockHttpClient::new().with_response(URL, response);
        let provider = AnthropicProvider::new(client, "sk-ant-test", &config());

        let error = provider
            .generate("?", None, &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(error, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_missing_api_key_means_unavailable() {
        let provider = AnthropicProvider::new(MockHttpClient::new(), "", &config());
        assert!(!provider.is_available().await);
    }
}
