//! Feature-hashing encoder
//!
//! Maps each word to a signed slot in a fixed-size vector. No model files,
//! no network, fully deterministic. Similarity reduces to weighted word
//! overlap, which is enough for keyword-style knowledge bases and for tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::Encoder;
use crate::errors::{QaError, Result};

pub const DEFAULT_DIMENSION: usize = 1024;

/// Bag-of-words encoder using the hashing trick
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dimension: usize,
    model_id: String,
}

impl HashingEncoder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(QaError::Config(
                "hashing encoder dimension must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            model_id: format!("hashing-bow-{}", dimension),
        })
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let hash = hash_token(&token);
            let slot = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[slot] += sign;
        }
        vector
    }
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            model_id: format!("hashing-bow-{}", DEFAULT_DIMENSION),
        }
    }
}

impl Encoder for HashingEncoder {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Lowercased alphanumeric words minus stopwords.
///
/// Text made only of stopwords keeps all of its words, so it still has a
/// non-zero vector that matches itself.
fn tokenize(text: &str) -> Vec<String> {
    let words: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|s| s.to_string())
        .collect();

    let content: Vec<String> = words.iter().filter(|w| !is_stopword(w)).cloned().collect();
    if content.is_empty() {
        words
    } else {
        content
    }
}

fn is_stopword(word: &str) -> bool {
    matches!(
        word,
        "a" | "an" | "the" | "is" | "are" | "was" | "be" | "what" | "who" | "how" | "why"
            | "when" | "where" | "which" | "do" | "does" | "can" | "i" | "me" | "my" | "you"
            | "your" | "we" | "our" | "it" | "of" | "to" | "in" | "on" | "for" | "and" | "or"
            | "about" | "tell" | "please" | "this" | "that" | "with" | "from"
    )
}

fn hash_token(token: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_punctuation_and_stopwords() {
        assert_eq!(tokenize("What is ISO 27001?"), vec!["iso", "27001"]);
        assert_eq!(tokenize("PCI-DSS"), vec!["pci", "dss"]);
        assert!(tokenize("  ?!  ").is_empty());
    }

    #[test]
    fn test_dimension() {
        let encoder = HashingEncoder::new(64).unwrap();
        assert_eq!(encoder.dimension(), 64);
        assert_eq!(encoder.encode("hello").unwrap().len(), 64);
        assert_eq!(encoder.model_id(), "hashing-bow-64");
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(HashingEncoder::new(0), Err(QaError::Config(_))));
    }

    #[test]
    fn test_deterministic_and_batch_consistent() {
        let encoder = HashingEncoder::default();
        let batch = encoder.encode_batch(&["SOC 2 audit", "GDPR"]).unwrap();
        assert_eq!(batch[0], encoder.encode("SOC 2 audit").unwrap());
        assert_eq!(batch[1], encoder.encode("GDPR").unwrap());
    }

    #[test]
    fn test_case_insensitive() {
        let encoder = HashingEncoder::default();
        assert_eq!(encoder.encode("HIPAA").unwrap(), encoder.encode("hipaa").unwrap());
    }

    #[test]
    fn test_stopword_only_text_keeps_its_words() {
        assert_eq!(tokenize("What is it?"), vec!["what", "is", "it"]);

        let encoder = HashingEncoder::default();
        let v = encoder.encode("What is it?").unwrap();
        assert!(v.iter().any(|x| *x != 0.0));
        assert_eq!(v, encoder.encode("what is it").unwrap());
    }
}
