use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::HttpClientTrait;
use crate::domain::error::ProviderError;
use crate::domain::model::{
    Generation, GenerationParams, ModelProvider, ProviderConfig, ProviderIdentity, ProviderKind,
    TokenUsage,
};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// OpenAI chat completions provider
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    identity: ProviderIdentity,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, config: &ProviderConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url,
            identity: ProviderIdentity::new(
                &config.model_name,
                ProviderKind::OpenAi,
                config.cost_per_input_token,
                config.cost_per_output_token,
            ),
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        params: &GenerationParams,
    ) -> serde_json::Value {
        let mut messages = Vec::new();
        if let Some(system) = system_prompt {
            messages.push(serde_json::json!({"role": "system", "content": system}));
        }
        messages.push(serde_json::json!({"role": "user", "content": prompt}));

        serde_json::json!({
            "model": self.identity.model_name,
            "messages": messages,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<(String, TokenUsage), ProviderError> {
        let response: OpenAiResponse = serde_json::from_value(json)
            .map_err(|e| ProviderError::malformed(format!("Failed to parse response: {e}")))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::malformed("No choices in response"))?;

        let usage = response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok((choice.message.content.unwrap_or_default(), usage))
    }
}

#[async_trait]
impl<C: HttpClientTrait> ModelProvider for OpenAiProvider<C> {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        params: &GenerationParams,
    ) -> Result<Generation, ProviderError> {
        let url = self.chat_completions_url();
        let body = self.build_request(prompt, system_prompt, params);

        let start = Instant::now();
        let response = self.client.post_json(&url, self.headers(), &body).await?;
        let latency = start.elapsed();

        let (text, usage) = self.parse_response(response)?;
        Ok(Generation::new(text, latency, usage))
    }

    async fn is_available(&self) -> bool {
        // No ping endpoint worth billing for; a missing key is the only
        // condition detectable up front.
        self.auth_header != "Bearer "
    }

    fn identity(&self) -> ProviderIdentity {
        self.identity.clone()
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::super::http_client::mock::MockHttpClient;
    use super::*;

    const URL: &str = "https://api.openai.com/v1/chat/completions";

    fn config() -> ProviderConfig {
        ProviderConfig::new("gpt-4o", ProviderKind::OpenAi).with_cost_rates(0.005, 0.015)
    }

    fn chat_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 34, "total_tokens": 46}
        })
    }

    #[tokio::test]
    async fn test_generate_parses_text_and_usage() {
        let client = MockHttpClient::new().with_response(URL, chat_response("Paris"));
        let provider = OpenAiProvider::new(client, "sk-test", &config());

        let generation = provider
            .generate("Capital of France?", Some("Be terse"), &GenerationParams::default())
            .await
            .unwrap();

        assert_eq!(generation.text, "Paris");
        assert_eq!(generation.usage, TokenUsage::new(12, 34));
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed() {
        let response = serde_json::json!({"choices": [], "usage": null});
        let client = MockHttpClient::new().with_response(URL, response);
        let provider = OpenAiProvider::new(client, "sk-test", &config());

        let error = provider
            .generate("?", None, &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(error, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_http_errors_pass_through() {
        let client =
            MockHttpClient::new().with_error(URL, ProviderError::rate_limited("HTTP 429"));
        let provider = OpenAiProvider::new(client, "sk-test", &config());

        let error = provider
            .generate("?", None, &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn test_missing_api_key_means_unavailable() {
        let provider = OpenAiProvider::new(MockHttpClient::new(), "", &config());
        assert!(!provider.is_available().await);
    }

    #[tokio::test]
    async fn test_base_url_override() {
        let url = "http://localhost:8080/v1/chat/completions";
        let client = MockHttpClient::new().with_response(url, chat_response("ok"));
        let provider = OpenAiProvider::new(
            client,
            "sk-test",
            &config().with_base_url("http://localhost:8080/"),
        );

        let generation = provider
            .generate("?", None, &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(generation.text, "ok");
    }
}
