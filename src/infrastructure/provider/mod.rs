//! Concrete model provider clients and their HTTP plumbing

pub mod anthropic;
pub mod factory;
pub mod http_client;
pub mod ollama;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use http_client::{HttpClient, HttpClientTrait};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
