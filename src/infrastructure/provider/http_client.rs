use async_trait::async_trait;

use crate::domain::error::ProviderError;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError>;

    async fn get(&self, url: &str) -> Result<serde_json::Value, ProviderError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::unavailable(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::timeout(format!("Request timed out: {e}"))
    } else {
        ProviderError::unavailable(format!("Request failed: {e}"))
    }
}

async fn map_status_error(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match status.as_u16() {
        429 => ProviderError::rate_limited(format!("HTTP 429: {body}")),
        401 | 403 => ProviderError::auth_failure(format!("HTTP {status}: {body}")),
        408 => ProviderError::timeout(format!("HTTP 408: {body}")),
        500..=599 => ProviderError::unavailable(format!("HTTP {status}: {body}")),
        _ => ProviderError::malformed(format!("HTTP {status}: {body}")),
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.json(body).send().await.map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(map_status_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(format!("Failed to parse response: {e}")))
    }

    async fn get(&self, url: &str) -> Result<serde_json::Value, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(map_status_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(format!("Failed to parse response: {e}")))
    }
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::RwLock;

    use super::*;

    /// In-memory double keyed by URL
    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        responses: RwLock<HashMap<String, serde_json::Value>>,
        errors: RwLock<HashMap<String, ProviderError>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, url: impl Into<String>, response: serde_json::Value) -> Self {
            self.responses.write().unwrap().insert(url.into(), response);
            self
        }

        pub fn with_error(self, url: impl Into<String>, error: ProviderError) -> Self {
            self.errors.write().unwrap().insert(url.into(), error);
            self
        }

        fn lookup(&self, url: &str) -> Result<serde_json::Value, ProviderError> {
            if let Some(error) = self.errors.read().unwrap().get(url) {
                return Err(error.clone());
            }

            self.responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| ProviderError::unavailable(format!("No mock response for {url}")))
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            _headers: Vec<(&str, &str)>,
            _body: &serde_json::Value,
        ) -> Result<serde_json::Value, ProviderError> {
            self.lookup(url)
        }

        async fn get(&self, url: &str) -> Result<serde_json::Value, ProviderError> {
            self.lookup(url)
        }
    }
}
