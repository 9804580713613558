use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub data: DataConfig,
    pub rag: RagConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Cohere,
    OpenAi,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub base_url: String,
    pub embed_model: String,
    pub completion_model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DataConfig {
    pub root: PathBuf,
    pub cache_dir: PathBuf,
    pub companies: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RagConfig {
    pub chunk_size: usize,
    pub min_chunk_chars: usize,
    pub answers_per_question: usize,
    pub min_similarity: f32,
    pub completion_temperature: f32,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(true))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Startup-fatal checks: a provider cannot be constructed without a key,
    /// and a temperature outside [0, 1] is rejected by the generation API.
    fn validate(&self) -> Result<()> {
        if self.provider.api_key.trim().is_empty() {
            anyhow::bail!(
                "provider API key is not set (supply APP__PROVIDER__API_KEY or .env)"
            );
        }
        if !(0.0..=1.0).contains(&self.rag.completion_temperature) {
            anyhow::bail!(
                "rag.completion_temperature must be in [0, 1], got {}",
                self.rag.completion_temperature
            );
        }
        Ok(())
    }
}
