use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::providers::{require_api_key, ModelProvider, MAX_COMPLETION_TOKENS, STOP_SEQUENCE};
use crate::utils::error::ApiError;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: usize,
    temperature: f32,
    stop_sequences: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
}

/// Cohere `v1/embed` + `v1/generate` integration.
pub struct CohereProvider {
    client: Client,
    api_key: String,
    base_url: String,
    embed_model: String,
    completion_model: String,
}

impl CohereProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        let api_key = require_api_key(config)?;
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(config.timeout_seconds))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            embed_model: config.embed_model.clone(),
            completion_model: config.completion_model.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ModelProvider for CohereProvider {
    fn tag(&self) -> &'static str {
        "cohere"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        debug!("Embedding {} chars via Cohere", text.len());

        let request = EmbedRequest {
            model: &self.embed_model,
            texts: vec![text],
        };

        let response = self
            .client
            .post(format!("{}/v1/embed", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Provider(format!("embed request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Provider(format!(
                "embed API error ({status}): {body}"
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Provider(format!("malformed embed response: {e}")))?;

        parsed
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Provider("embed response contained no vectors".to_string()))
    }

    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ApiError> {
        debug!("Generating completion via Cohere, temperature {temperature}");

        let request = GenerateRequest {
            model: &self.completion_model,
            prompt,
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature,
            stop_sequences: vec![STOP_SEQUENCE],
        };

        let response = self
            .client
            .post(format!("{}/v1/generate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Provider(format!("generate request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Provider(format!(
                "generate API error ({status}): {body}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Provider(format!("malformed generate response: {e}")))?;

        parsed
            .generations
            .into_iter()
            .next()
            .map(|generation| generation.text)
            .ok_or_else(|| ApiError::Provider("generate response contained no candidates".to_string()))
    }
}
