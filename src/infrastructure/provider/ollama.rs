use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::HttpClientTrait;
use crate::domain::error::ProviderError;
use crate::domain::model::{
    Generation, GenerationParams, ModelProvider, ProviderConfig, ProviderIdentity, ProviderKind,
    TokenUsage,
};

const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Local Ollama provider. Token costs are zero by definition.
#[derive(Debug)]
pub struct OllamaProvider<C: HttpClientTrait> {
    client: C,
    base_url: String,
    identity: ProviderIdentity,
}

impl<C: HttpClientTrait> OllamaProvider<C> {
    pub fn new(client: C, config: &ProviderConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            client,
            base_url,
            identity: ProviderIdentity::new(&config.model_name, ProviderKind::Local, 0.0, 0.0),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url)
    }

    fn build_request(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        params: &GenerationParams,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.identity.model_name,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": params.temperature,
                "num_predict": params.max_tokens,
            },
        });

        if let Some(system) = system_prompt {
            body["system"] = serde_json::json!(system);
        }

        body
    }
}

#[async_trait]
impl<C: HttpClientTrait> ModelProvider for OllamaProvider<C> {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        params: &GenerationParams,
    ) -> Result<Generation, ProviderError> {
        let url = self.generate_url();
        let body = self.build_request(prompt, system_prompt, params);

        let start = Instant::now();
        let json = self.client.post_json(&url, vec![], &body).await?;
        let latency = start.elapsed();

        let response: OllamaResponse = serde_json::from_value(json)
            .map_err(|e| ProviderError::malformed(format!("Failed to parse response: {e}")))?;

        let usage = TokenUsage::new(
            response.prompt_eval_count.unwrap_or(0),
            response.eval_count.unwrap_or(0),
        );
        Ok(Generation::new(response.response, latency, usage))
    }

    async fn is_available(&self) -> bool {
        self.client.get(&self.tags_url()).await.is_ok()
    }

    fn identity(&self) -> ProviderIdentity {
        self.identity.clone()
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::super::http_client::mock::MockHttpClient;
    use super::*;

    const GENERATE_URL: &str = "http://localhost:11434/api/generate";
    const TAGS_URL: &str = "http://localhost:11434/api/tags";

    fn config() -> ProviderConfig {
        ProviderConfig::new("llama3", ProviderKind::Local)
    }

    #[tokio::test]
    async fn test_generate_parses_response() {
        let response = serde_json::json!({
            "model": "llama3",
            "response": "Paris",
            "done": true,
            "prompt_eval_count": 15,
            "eval_count": 3
        });
        let client = MockHttpClient::new().with_response(GENERATE_URL, response);
        let provider = OllamaProvider::new(client, &config());

        let generation = provider
            .generate("Capital of France?", None, &GenerationParams::default())
            .await
            .unwrap();

        assert_eq!(generation.text, "Paris");
        assert_eq!(generation.usage, TokenUsage::new(15, 3));
        // Local models never bill
        assert_eq!(provider.identity().cost_usd(&generation.usage), 0.0);
    }

    #[tokio::test]
    async fn test_missing_token_counts_default_to_zero() {
        let response = serde_json::json!({"response": "hi", "done": true});
        let client = MockHttpClient::new().with_response(GENERATE_URL, response);
        let provider = OllamaProvider::new(client, &config());

        let generation = provider
            .generate("?", None, &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(generation.usage, TokenUsage::default());
    }

    #[tokio::test]
    async fn test_availability_probes_tags_endpoint() {
        let up = OllamaProvider::new(
            MockHttpClient::new().with_response(TAGS_URL, serde_json::json!({"models": []})),
            &config(),
        );
        assert!(up.is_available().await);

        let down = OllamaProvider::new(
            MockHttpClient::new().with_error(TAGS_URL, ProviderError::unavailable("refused")),
            &config(),
        );
        assert!(!down.is_available().await);
    }
}
