pub mod document;
pub mod persist;
pub mod pipeline;
pub mod search;
pub mod stoplist;
pub mod tokenizer;
mod types;

pub use types::{DocId, LexiconEntry, Metadata, Posting, TermCounts};
