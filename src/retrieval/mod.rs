//! Retrieval: best-match search over cached question embeddings
//!
//! Components:
//! - Vector math: normalization, dot product, first-max selection
//! - Retrieval Engine: owns the knowledge base, the encoder and the
//!   one-time representation cache

pub mod engine;
pub mod vector;

pub use engine::{QueryResult, RepresentationCache, RetrievalEngine, DEFAULT_BATCH_SIZE};
