//! Per-file persisted embedding tables.
//!
//! One bincode-encoded table per source filing, keyed by sanitized filename
//! plus the provider tag. A present, decodable table is trusted verbatim;
//! staleness against the live chunker output is the caller's responsibility
//! (`use_cache = false` forces a rebuild).

use bincode::config::standard as bincode_config;
use bincode::{decode_from_slice, encode_to_vec, Decode, Encode};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use tiktoken_rs::CoreBPE;
use tracing::{info, warn};

use crate::document::TextChunker;
use crate::models::Chunk;
use crate::providers::SharedProvider;
use crate::utils::error::ApiError;

/// GPT-2 vocabulary, matching the tokenizer the `n_tokens` column has always
/// been counted with.
static TOKENIZER: Lazy<CoreBPE> =
    Lazy::new(|| tiktoken_rs::r50k_base().expect("load r50k_base tokenizer"));

pub fn count_tokens(text: &str) -> usize {
    TOKENIZER.encode_with_special_tokens(text).len()
}

/// Persisted cache unit. The version and provider fields gate trust: a table
/// written by another schema or another provider is rebuilt, never reused.
#[derive(Debug, Encode, Decode)]
pub struct ChunkTable {
    pub version: u32,
    pub provider: String,
    pub chunks: Vec<Chunk>,
}

impl ChunkTable {
    pub const VERSION: u32 = 1;
}

pub struct EmbeddingCache {
    dir: PathBuf,
    provider: SharedProvider,
    chunker: TextChunker,
}

impl EmbeddingCache {
    pub fn new(dir: PathBuf, provider: SharedProvider, chunker: TextChunker) -> Self {
        Self {
            dir,
            provider,
            chunker,
        }
    }

    /// Returns the chunk table for one filing, building and persisting it
    /// through the provider when the cache cannot serve it.
    ///
    /// The table is written atomically (temp file + rename) only after every
    /// chunk has embedded; an embedding failure aborts with nothing
    /// persisted, so no table on disk is ever half-embedded.
    pub async fn get_or_build(
        &self,
        source: &Path,
        chunks_hint: Option<Vec<String>>,
        use_cache: bool,
    ) -> Result<Vec<Chunk>, ApiError> {
        let table_path = self.table_path(source)?;

        if use_cache {
            if let Some(chunks) = self.load(&table_path).await {
                return Ok(chunks);
            }
        }

        let texts = match chunks_hint {
            Some(chunks) => chunks,
            None => self.chunker.chunk_file(source)?,
        };

        let mut chunks = Vec::with_capacity(texts.len());
        for (i, text) in texts.into_iter().enumerate() {
            let embedding = self.provider.embed(&text).await?;
            let n_tokens = count_tokens(&text);
            chunks.push(Chunk {
                text,
                n_tokens,
                embedding,
            });
            if (i + 1) % 10 == 0 {
                info!("{} chunks embedded", i + 1);
            }
        }

        self.persist(&table_path, &chunks).await?;
        Ok(chunks)
    }

    /// Cache key: filename with every non-alphanumeric character normalized
    /// to `_`, suffixed with the provider tag.
    fn table_path(&self, source: &Path) -> Result<PathBuf, ApiError> {
        let name = source
            .file_name()
            .ok_or_else(|| ApiError::BadRequest(format!("not a file path: {}", source.display())))?
            .to_string_lossy();
        let sanitized: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        Ok(self
            .dir
            .join(format!("{sanitized}_embeddings_{}.bin", self.provider.tag())))
    }

    /// Attempts to serve a persisted table. Anything short of a decodable,
    /// version-matched, provider-matched table counts as a miss.
    async fn load(&self, table_path: &Path) -> Option<Vec<Chunk>> {
        let data = match tokio::fs::read(table_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("unreadable cache table {}: {}", table_path.display(), e);
                return None;
            }
        };

        let table: ChunkTable = match decode_from_slice(&data, bincode_config()) {
            Ok((table, _)) => table,
            Err(e) => {
                warn!(
                    "corrupt cache table {}, rebuilding: {}",
                    table_path.display(),
                    e
                );
                return None;
            }
        };

        if table.version != ChunkTable::VERSION || table.provider != self.provider.tag() {
            warn!(
                "stale cache table {} (version {}, provider {}), rebuilding",
                table_path.display(),
                table.version,
                table.provider
            );
            return None;
        }

        Some(table.chunks)
    }

    async fn persist(&self, table_path: &Path, chunks: &[Chunk]) -> Result<(), ApiError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ApiError::Cache(format!("create {}: {}", self.dir.display(), e)))?;

        let table = ChunkTable {
            version: ChunkTable::VERSION,
            provider: self.provider.tag().to_string(),
            chunks: chunks.to_vec(),
        };
        let encoded = encode_to_vec(&table, bincode_config())
            .map_err(|e| ApiError::Cache(format!("encode table: {e}")))?;

        let tmp_path = table_path.with_extension("bin.tmp");
        tokio::fs::write(&tmp_path, &encoded)
            .await
            .map_err(|e| ApiError::Cache(format!("write {}: {}", tmp_path.display(), e)))?;
        tokio::fs::rename(&tmp_path, table_path)
            .await
            .map_err(|e| ApiError::Cache(format!("rename {}: {}", table_path.display(), e)))?;

        info!(
            "persisted {} chunks to {}",
            table.chunks.len(),
            table_path.display()
        );
        Ok(())
    }
}
