//! Model provider contract - the capability seam vendor clients plug into

mod config;
mod provider;
mod response;

pub use config::{GenerationParams, ProviderConfig, ProviderKind};
pub use provider::ModelProvider;
pub use response::{Generation, ProviderIdentity, TokenUsage};

#[cfg(test)]
pub use provider::mock;
