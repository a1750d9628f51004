mod cascade;
mod gemini;
#[cfg(test)]
pub mod mock;

pub use cascade::{candidate_list, invoke, Invocation};
pub use gemini::GeminiClient;

use crate::config::Config;
use crate::error::ProviderError;
use async_trait::async_trait;
use std::sync::Arc;

/// A generative model reachable by identifier.
#[async_trait]
pub trait ModelClient: Send + Sync {
    fn name(&self) -> &'static str;

    /// Send one prompt to `model` and return its raw text output.
    /// An empty string means the provider answered without any text.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError>;
}

/// Create the model client described by the configuration
pub fn create_client(config: &Config) -> Result<Arc<dyn ModelClient>, ProviderError> {
    Ok(Arc::new(GeminiClient::new(
        config.base_url.clone(),
        config.api_key.clone(),
        config.temperature,
        config.max_output_tokens,
    )?))
}
