use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::cache::EmbeddingCache;
use crate::document::{company_dir, list_filings};
use crate::models::{AnswerRecord, Chunk};
use crate::providers::SharedProvider;
use crate::utils::cosine_similarity;
use crate::utils::error::ApiError;

struct CorpusRow {
    filename: String,
    chunk: Chunk,
}

/// Per-company chunk corpora backing the question-answer API.
///
/// Warmed once at startup through the embedding cache; from then on serving
/// is read-only, so the lock is only ever contended during warm-up. A chunk's
/// global index within its company corpus is the `id` the API exposes and the
/// handle its filename is resolved from.
pub struct CompanyCatalog {
    companies: Vec<String>,
    data_root: PathBuf,
    cache: Arc<EmbeddingCache>,
    provider: SharedProvider,
    corpora: RwLock<HashMap<String, Vec<CorpusRow>>>,
}

impl CompanyCatalog {
    pub fn new(
        companies: Vec<String>,
        data_root: PathBuf,
        cache: Arc<EmbeddingCache>,
        provider: SharedProvider,
    ) -> Self {
        Self {
            companies,
            data_root,
            cache,
            provider,
            corpora: RwLock::new(HashMap::new()),
        }
    }

    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    /// Builds (or loads from cache) the chunk tables of every configured
    /// company. Sequential by design; any failure aborts startup.
    pub async fn warm(&self) -> Result<(), ApiError> {
        for company in &self.companies {
            let rows = self.build_corpus(company).await?;
            info!("indexed {} chunks for {}", rows.len(), company);
            self.corpora.write().await.insert(company.clone(), rows);
        }
        Ok(())
    }

    async fn build_corpus(&self, company: &str) -> Result<Vec<CorpusRow>, ApiError> {
        let dir = company_dir(&self.data_root, company);
        let mut rows = Vec::new();
        for file in list_filings(&dir)? {
            let filename = file
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            let chunks = self.cache.get_or_build(&file, None, true).await?;
            for chunk in chunks {
                rows.push(CorpusRow {
                    filename: filename.clone(),
                    chunk,
                });
            }
        }
        Ok(rows)
    }

    /// Answers one question against a company corpus: embed the question,
    /// score every chunk, return the best match with its source filename.
    pub async fn answer(&self, company: &str, question: &str) -> Result<AnswerRecord, ApiError> {
        if question.trim().is_empty() {
            return Err(ApiError::BadRequest("question is empty".to_string()));
        }

        // Resolve the corpus before spending a provider call on the query
        let corpora = self.corpora.read().await;
        let rows = corpora
            .get(company)
            .ok_or_else(|| ApiError::NotFound(format!("unknown company: {company}")))?;

        let query_embedding = self.provider.embed(question).await?;

        let mut best: Option<(usize, f32)> = None;
        for (id, row) in rows.iter().enumerate() {
            let similarity = cosine_similarity(&row.chunk.embedding, &query_embedding)
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            let better = match best {
                Some((_, top)) => similarity
                    .partial_cmp(&top)
                    .is_some_and(|ord| ord == Ordering::Greater),
                None => true,
            };
            if better {
                best = Some((id, similarity));
            }
        }

        let (id, similarity) = best.ok_or_else(|| {
            ApiError::NotFound(format!("no indexed passages for {company}"))
        })?;
        let row = &rows[id];
        Ok(AnswerRecord {
            id,
            text: row.chunk.text.clone(),
            similarity,
            filename: row.filename.clone(),
        })
    }

    /// Batch variant: one answer per question, sequentially, in request order.
    pub async fn answer_batch(
        &self,
        company: &str,
        questions: &[String],
    ) -> Result<Vec<AnswerRecord>, ApiError> {
        let mut answers = Vec::with_capacity(questions.len());
        for question in questions {
            answers.push(self.answer(company, question).await?);
        }
        Ok(answers)
    }
}
