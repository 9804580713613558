use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::providers::{require_api_key, ModelProvider, MAX_COMPLETION_TOKENS, STOP_SEQUENCE};
use crate::utils::error::ApiError;

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: usize,
    temperature: f32,
    stop: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: String,
}

/// OpenAI `v1/embeddings` + `v1/completions` integration. Same call shape as
/// the Cohere provider, different wire format and model names.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    embed_model: String,
    completion_model: String,
}

impl OpenAiProvider {
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
impl ModelProvider for OpenAiProvider {
    fn tag(&self) -> &'static str {
        "openai"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        debug!("Embedding {} chars via OpenAI", text.len());

        let request = EmbeddingsRequest {
            model: &self.embed_model,
            input: text,
        };

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
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

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Provider(format!("malformed embed response: {e}")))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|row| row.embedding)
            .ok_or_else(|| ApiError::Provider("embed response contained no vectors".to_string()))
    }

    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ApiError> {
        debug!("Generating completion via OpenAI, temperature {temperature}");

        let request = CompletionRequest {
            model: &self.completion_model,
            prompt,
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature,
            stop: vec![STOP_SEQUENCE],
        };

        let response = self
            .client
            .post(format!("{}/v1/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Provider(format!("completion request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Provider(format!(
                "completion API error ({status}): {body}"
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Provider(format!("malformed completion response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| ApiError::Provider("completion response contained no choices".to_string()))
    }
}
