mod chunker;
mod filings;

pub use chunker::TextChunker;
pub use filings::{company_dir, is_pooled, list_filings};
