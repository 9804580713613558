use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::cache::EmbeddingCache;
use crate::config::RagConfig;
use crate::models::SummaryRecord;
use crate::providers::SharedProvider;
use crate::services::{build_prompt, search_many};
use crate::utils::error::ApiError;

/// Drives the chunk → embed → search → prompt → complete pipeline over a list
/// of filings and questions.
pub struct Summarizer {
    cache: Arc<EmbeddingCache>,
    provider: SharedProvider,
    config: RagConfig,
}

impl Summarizer {
    pub fn new(cache: Arc<EmbeddingCache>, provider: SharedProvider, config: RagConfig) -> Self {
        Self {
            cache,
            provider,
            config,
        }
    }

    /// `summarize` with the configured default completion temperature.
    pub async fn summarize_with_defaults(
        &self,
        files: &[PathBuf],
        questions: &[String],
    ) -> Result<Vec<SummaryRecord>, ApiError> {
        self.summarize(files, questions, self.config.completion_temperature)
            .await
    }

    /// Produces one `SummaryRecord` per (file, matched chunk) pair, in file
    /// then question then rank order.
    ///
    /// Strictly sequential: one provider call in flight at a time, and the
    /// first hard failure aborts the whole run with no partial results.
    pub async fn summarize(
        &self,
        files: &[PathBuf],
        questions: &[String],
        temperature: f32,
    ) -> Result<Vec<SummaryRecord>, ApiError> {
        let mut records = Vec::new();

        for file in files {
            let filename = file
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| file.display().to_string());
            info!("summarizing filing {filename}");

            let table = self.cache.get_or_build(file, None, true).await?;
            let matches = search_many(
                self.provider.as_ref(),
                &table,
                questions,
                self.config.answers_per_question,
                self.config.min_similarity,
            )
            .await?;

            for matched in matches {
                let prompt = build_prompt(&matched.text, &matched.question);
                let summary = self.provider.complete(&prompt, temperature).await?;
                records.push(SummaryRecord {
                    filename: filename.clone(),
                    query: matched.question,
                    snippet: matched.text,
                    summary,
                    confidence: matched.similarity,
                });
            }
        }

        Ok(records)
    }
}
