mod cohere;
mod openai;

pub use cohere::CohereProvider;
pub use openai::OpenAiProvider;

use std::sync::Arc;

use crate::config::{ProviderConfig, ProviderKind};
use crate::utils::error::ApiError;

/// Generation parameters fixed across providers: the original pipeline always
/// asks for up to 400 tokens and stops at a paragraph-ending period.
pub(crate) const MAX_COMPLETION_TOKENS: usize = 400;
pub(crate) const STOP_SEQUENCE: &str = ".\n\n";

/// Single capability seam over the external AI APIs. One text in, one vector
/// out; no batching is exposed even where the transport supports it. Errors
/// propagate unchanged to the caller; no retries happen here.
#[async_trait::async_trait]
pub trait ModelProvider: Send + Sync {
    /// Short provider tag mixed into cache keys so two providers never
    /// collide on the same filing.
    fn tag(&self) -> &'static str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError>;

    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ApiError>;
}

pub type SharedProvider = Arc<dyn ModelProvider>;

/// Selects the provider implementation from configuration.
pub fn build_provider(config: &ProviderConfig) -> Result<SharedProvider, ApiError> {
    match config.kind {
        ProviderKind::Cohere => Ok(Arc::new(CohereProvider::new(config)?)),
        ProviderKind::OpenAi => Ok(Arc::new(OpenAiProvider::new(config)?)),
    }
}

pub(crate) fn require_api_key(config: &ProviderConfig) -> Result<String, ApiError> {
    let key = config.api_key.trim();
    if key.is_empty() {
        return Err(ApiError::Internal(
            "provider API key is not set".to_string(),
        ));
    }
    Ok(key.to_string())
}
