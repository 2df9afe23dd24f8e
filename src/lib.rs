//! kbqa - question answering over a curated question/answer knowledge base
//!
//! A query is matched against every stored question by cosine similarity
//! of sentence embeddings; the answer paired with the closest question is
//! returned along with its score.
//!
//! # Architecture
//!
//! - **knowledge**: line-delimited record loader and `KnowledgeBase`
//! - **embedding**: `Encoder` trait with BERT (Candle) and hashing backends
//! - **retrieval**: `RetrievalEngine` with a one-time representation cache
//! - **responder**: caller-side confidence cutoff and fallback message
//! - **cli** / **bootstrap** / **chat**: configuration and the `kbqa` binary

pub mod errors;
pub mod knowledge;
pub mod embedding;
pub mod retrieval;
pub mod responder;

pub use errors::{QaError, Result};
pub use embedding::Encoder;
pub use knowledge::{KnowledgeBase, QaPair};
pub use retrieval::{QueryResult, RetrievalEngine};

pub mod bootstrap;
pub mod chat;
pub mod cli;
