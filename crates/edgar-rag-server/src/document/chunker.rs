use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::document::filings::is_pooled;
use crate::utils::error::ApiError;

/// Pooled 10-K files carry item1, item1a and item7 concatenated behind
/// `####`-prefixed marker lines.
static SECTION_DELIM: Lazy<Regex> =
    Lazy::new(|| Regex::new("####.+").expect("section delimiter pattern"));

#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    min_chunk_chars: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, min_chunk_chars: usize) -> Self {
        Self {
            chunk_size,
            min_chunk_chars,
        }
    }

    /// Reads and chunks one filing. An unreadable file propagates the read
    /// error; there is no partial chunk list.
    pub fn chunk_file(&self, path: &Path) -> Result<Vec<String>, ApiError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(self.chunk_text(&raw, is_pooled(path)))
    }

    /// Splits raw filing text into bounded-size passages.
    ///
    /// Literal `$` is escaped first (downstream renderers treat it as a math
    /// marker). Pooled documents are split on the section delimiter and each
    /// section is chunked independently with no post-filter; plain documents
    /// are chunked whole, then degenerate chunks are dropped.
    pub fn chunk_text(&self, raw: &str, pooled: bool) -> Vec<String> {
        let escaped = raw.replace('$', "\\$");
        if pooled {
            SECTION_DELIM
                .split(&escaped)
                .flat_map(|section| self.split_section(section))
                .collect()
        } else {
            self.split_section(&escaped)
                .into_iter()
                .filter(|chunk| chunk.trim().chars().count() >= self.min_chunk_chars)
                .collect()
        }
    }

    /// Packs blank-line separated paragraphs into chunks of at most
    /// `chunk_size` characters, preserving source order. A single paragraph
    /// over the budget is hard-split at the budget.
    fn split_section(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0usize;

        for paragraph in text.split("\n\n") {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }
            let paragraph_chars = paragraph.chars().count();

            if paragraph_chars > self.chunk_size {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                    current_chars = 0;
                }
                chunks.extend(hard_split(paragraph, self.chunk_size));
                continue;
            }

            let separator_chars = if current.is_empty() { 0 } else { 2 };
            if current_chars + separator_chars + paragraph_chars > self.chunk_size
                && !current.is_empty()
            {
                chunks.push(std::mem::take(&mut current));
                current_chars = 0;
            }

            if !current.is_empty() {
                current.push_str("\n\n");
                current_chars += 2;
            }
            current.push_str(paragraph);
            current_chars += paragraph_chars;
        }

        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}

fn hard_split(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|piece| piece.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn plain_chunks_reconstruct_the_source() {
        let raw = "Item 1. Business overview of the registrant goes here.\n\n\
                   Item 1A. Risk factors include commodity price swings.\n\n\
                   Item 7. Management discussion of liquidity and capital.";
        let chunker = TextChunker::new(60, 5);

        let chunks = chunker.chunk_text(raw, false);
        assert!(chunks.len() > 1);
        assert_eq!(normalize(&chunks.join(" ")), normalize(raw));

        // Re-chunking the same input is idempotent
        assert_eq!(chunks, chunker.chunk_text(raw, false));
    }

    #[test]
    fn pooled_sections_equal_delimiter_count_plus_one() {
        let raw = "Business description paragraph.\n\
                   #### item1a\n\
                   Risk factor paragraph.\n\
                   #### item7\n\
                   Liquidity paragraph.";
        let chunker = TextChunker::new(500, 5);

        let chunks = chunker.chunk_text(raw, true);
        // Each section fits one chunk, so chunks == delimiters + 1
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].contains("Business description"));
        assert!(chunks[1].contains("Risk factor"));
        assert!(chunks[2].contains("Liquidity"));
    }

    #[test]
    fn pooled_path_keeps_short_sections() {
        let raw = "#### item1a\nhi";
        let chunker = TextChunker::new(500, 50);
        assert_eq!(chunker.chunk_text(raw, true), vec!["hi".to_string()]);
    }

    #[test]
    fn plain_path_drops_degenerate_chunks() {
        let chunker = TextChunker::new(500, 50);
        assert!(chunker.chunk_text("too short", false).is_empty());
    }

    #[test]
    fn dollar_signs_are_escaped() {
        let chunker = TextChunker::new(500, 5);
        let chunks = chunker.chunk_text("Revenue was $4.2 billion this year.", false);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].contains("\\$4.2"));
    }

    #[test]
    fn oversized_paragraphs_are_hard_split() {
        let raw = "a".repeat(250);
        let chunker = TextChunker::new(100, 5);
        let chunks = chunker.chunk_text(&raw, false);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
    }
}
