//! Text encoders
//!
//! The retrieval engine only depends on the [`Encoder`] trait, so the
//! embedding model can be swapped or replaced with a test double.
//!
//! Backends:
//! - `BertEncoder`: sentence-transformer BERT model run locally via Candle
//! - `HashingEncoder`: offline bag-of-words feature hashing

pub mod bert;
pub mod hashing;

pub use bert::BertEncoder;
pub use hashing::HashingEncoder;

use crate::errors::{QaError, Result};

/// A deterministic text-to-vector function.
///
/// Implementations must return identical vectors for identical input
/// whether a text is encoded alone or inside a batch, and must be callable
/// from several threads at once.
pub trait Encoder: Send + Sync {
    /// Encode many texts, one vector per text, in input order
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Encode a single text
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.encode_batch(&[text])?
            .pop()
            .ok_or_else(|| QaError::Encoding("encoder returned no vector".to_string()))
    }

    /// Output vector length
    fn dimension(&self) -> usize;

    /// Model name and version, for logs
    fn model_id(&self) -> &str;
}

impl<E: Encoder + ?Sized> Encoder for Box<E> {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).encode_batch(texts)
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        (**self).encode(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

impl<E: Encoder + ?Sized> Encoder for std::sync::Arc<E> {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).encode_batch(texts)
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        (**self).encode(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}
