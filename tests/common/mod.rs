//! Shared test doubles and fixtures

#![allow(dead_code)]

use kbqa::embedding::{Encoder, HashingEncoder};
use kbqa::errors::{QaError, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Hashing encoder that counts every text it encodes
#[derive(Default)]
pub struct CountingEncoder {
    inner: HashingEncoder,
    texts: AtomicUsize,
    calls: AtomicUsize,
}

impl CountingEncoder {
    pub fn texts_encoded(&self) -> usize {
        self.texts.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Encoder for CountingEncoder {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        self.inner.encode_batch(texts)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_id(&self) -> &str {
        "counting"
    }
}

/// Fails until `recover` is called
#[derive(Default)]
pub struct FlakyEncoder {
    inner: HashingEncoder,
    healthy: AtomicBool,
}

impl FlakyEncoder {
    pub fn recover(&self) {
        self.healthy.store(true, Ordering::SeqCst);
    }
}

impl Encoder for FlakyEncoder {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if self.healthy.load(Ordering::SeqCst) {
            self.inner.encode_batch(texts)
        } else {
            Err(QaError::Encoding("model endpoint timed out".to_string()))
        }
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_id(&self) -> &str {
        "flaky"
    }
}

/// One knowledge base line in the two-turn record format
pub fn record_line(question: &str, answer: &str) -> String {
    serde_json::json!({
        "contents": [
            {"role": "user", "parts": [{"text": question}]},
            {"role": "model", "parts": [{"text": answer}]}
        ]
    })
    .to_string()
}
