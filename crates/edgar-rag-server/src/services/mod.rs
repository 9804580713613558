mod catalog;
mod pipeline;
mod prompt;
mod search;

pub use catalog::CompanyCatalog;
pub use pipeline::Summarizer;
pub use prompt::build_prompt;
pub use search::{search, search_many};
