use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// One embedded passage of a filing. Immutable once cached; identified by its
/// row position within the file's chunk table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Chunk {
    pub text: String,
    pub n_tokens: usize,
    pub embedding: Vec<f32>,
}

/// A ranked hit for one question, produced per query and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub text: String,
    pub similarity: f32,
    pub question: String,
}

/// Final output row of the summarization pipeline, one per (file, matched
/// chunk) pair.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRecord {
    pub filename: String,
    pub query: String,
    pub snippet: String,
    pub summary: String,
    pub confidence: f32,
}

/// Answer unit returned by the HTTP API. `id` is the chunk's global index
/// within the company corpus; `filename` is resolved from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: usize,
    pub text: String,
    pub similarity: f32,
    pub filename: String,
}
