//! Caller-side reply policy
//!
//! The retrieval engine always returns its best match. Whether a weak
//! match should be shown is a presentation decision, so the confidence
//! cutoff and the fallback message live here instead.

use serde::{Deserialize, Serialize};

use crate::embedding::Encoder;
use crate::errors::Result;
use crate::retrieval::{QueryResult, RetrievalEngine};

pub const DEFAULT_FALLBACK_MESSAGE: &str = "I'm sorry, I can only answer questions covered by my \
current knowledge base. Could you rephrase or ask about one of those topics?";

/// What the caller shows for a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub answer: String,
    pub score: f32,
    /// False when the fallback message replaced a below-cutoff match
    pub matched: bool,
    /// Stored question behind the answer (present even for fallbacks)
    pub question: String,
}

/// Wraps a retrieval engine with an optional minimum confidence
pub struct Responder<E: Encoder> {
    engine: RetrievalEngine<E>,
    min_confidence: Option<f32>,
    fallback_message: String,
}

impl<E: Encoder> Responder<E> {
    pub fn new(engine: RetrievalEngine<E>) -> Self {
        Self {
            engine,
            min_confidence: None,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: Option<f32>) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    pub fn engine(&self) -> &RetrievalEngine<E> {
        &self.engine
    }

    pub fn min_confidence(&self) -> Option<f32> {
        self.min_confidence
    }

    /// Answer `question`, substituting the fallback below the cutoff
    pub fn reply(&self, question: &str) -> Result<Reply> {
        let result = self.engine.answer(question)?;
        Ok(self.apply_policy(result))
    }

    fn apply_policy(&self, result: QueryResult) -> Reply {
        let confident = self.min_confidence.map_or(true, |min| result.score >= min);
        if !confident {
            tracing::info!(
                score = result.score,
                min_confidence = ?self.min_confidence,
                "Best match below confidence cutoff; using fallback"
            );
        }

        Reply {
            answer: if confident {
                result.answer
            } else {
                self.fallback_message.clone()
            },
            score: result.score,
            matched: confident,
            question: result.question,
        }
    }
}
