use std::cmp::Ordering;

use crate::models::{Chunk, SearchResult};
use crate::providers::ModelProvider;
use crate::utils::cosine_similarity;
use crate::utils::error::ApiError;

/// Ranks a chunk table against one question.
///
/// The query is embedded once, every chunk is scored by cosine similarity,
/// and the `min_similarity` filter applies *before* the descending sort and
/// `top_n` cut: a row below threshold is never exposed and never occupies a
/// top-N slot.
pub async fn search(
    provider: &dyn ModelProvider,
    table: &[Chunk],
    query: &str,
    top_n: usize,
    min_similarity: f32,
) -> Result<Vec<SearchResult>, ApiError> {
    let query_embedding = provider.embed(query).await?;

    let mut results = Vec::new();
    for chunk in table {
        let similarity = cosine_similarity(&chunk.embedding, &query_embedding)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        if similarity >= min_similarity {
            results.push(SearchResult {
                text: chunk.text.clone(),
                similarity,
                question: query.to_string(),
            });
        }
    }

    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    results.truncate(top_n);
    Ok(results)
}

/// Repeats `search` independently per question and concatenates the result
/// blocks, preserving per-question grouping order. Each row carries its
/// originating question.
pub async fn search_many(
    provider: &dyn ModelProvider,
    table: &[Chunk],
    questions: &[String],
    top_n: usize,
    min_similarity: f32,
) -> Result<Vec<SearchResult>, ApiError> {
    let mut all = Vec::new();
    for question in questions {
        let results = search(provider, table, question, top_n, min_similarity).await?;
        all.extend(results);
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::StubProvider;

    fn chunk(text: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            text: text.to_string(),
            n_tokens: 1,
            embedding,
        }
    }

    #[tokio::test]
    async fn ranks_by_cosine_similarity_and_filters_on_threshold() {
        let table = vec![
            chunk("oil spill risk", vec![1.0, 0.0]),
            chunk("no risk", vec![0.0, 1.0]),
        ];
        let provider = StubProvider::new(vec![1.0, 0.0]);

        let results = search(&provider, &table, "oil risks?", 3, 0.0).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "oil spill risk");
        assert!((results[0].similarity - 1.0).abs() < 1e-6);
        assert!(results[1].similarity.abs() < 1e-6);

        let filtered = search(&provider, &table, "oil risks?", 3, 0.5).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].text, "oil spill risk");
    }

    #[tokio::test]
    async fn returns_at_most_top_n_above_threshold_strictly_descending() {
        let table = vec![
            chunk("d", vec![0.0, 1.0]),
            chunk("c", vec![1.0, 3.0]),
            chunk("a", vec![1.0, 0.0]),
            chunk("e", vec![1.0, 10.0]),
            chunk("b", vec![1.0, 1.0]),
        ];
        let provider = StubProvider::new(vec![1.0, 0.0]);

        let results = search(&provider, &table, "q", 3, 0.25).await.unwrap();
        assert!(results.len() <= 3);
        assert!(results.iter().all(|r| r.similarity >= 0.25));
        assert!(results
            .windows(2)
            .all(|pair| pair[0].similarity > pair[1].similarity));
        let texts: Vec<_> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn threshold_applies_before_the_top_n_cut() {
        let table = vec![
            chunk("a", vec![1.0, 0.0]),
            chunk("b", vec![1.0, 1.0]),
            chunk("c", vec![1.0, 3.0]),
        ];
        let provider = StubProvider::new(vec![1.0, 0.0]);

        // Rows below threshold never occupy a top-N slot
        let results = search(&provider, &table, "q", 3, 0.8).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "a");
    }

    #[tokio::test]
    async fn multi_question_results_stay_grouped_in_question_order() {
        let table = vec![
            chunk("alpha", vec![1.0, 0.0]),
            chunk("beta", vec![0.0, 1.0]),
        ];
        let provider = StubProvider::new(vec![1.0, 0.0])
            .with_embedding("first?", vec![1.0, 0.0])
            .with_embedding("second?", vec![0.0, 1.0]);
        let questions = vec!["first?".to_string(), "second?".to_string()];

        let results = search_many(&provider, &table, &questions, 1, 0.25)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].question, "first?");
        assert_eq!(results[0].text, "alpha");
        assert_eq!(results[1].question, "second?");
        assert_eq!(results[1].text, "beta");
    }
}
