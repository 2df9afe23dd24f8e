//! Knowledge base: question/answer pairs and the line-delimited loader
//!
//! The on-disk record shape is private to `loader`; everything downstream
//! only sees `QaPair` and `KnowledgeBase`.

pub mod loader;
pub mod types;

pub use loader::{load, load_from_reader, parse_record, LoadReport, Loader, MalformedLinePolicy};
pub use types::{KnowledgeBase, QaPair};
