pub mod builder;
pub mod index;
pub mod persist;
pub mod query;
pub mod tokenizer;

pub use builder::IndexBuilder;
pub use index::{DocRef, Index, Posting, PostingsList};
pub use query::{search, SearchHit, DEFAULT_TOP_K};
