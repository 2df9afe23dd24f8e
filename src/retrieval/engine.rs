// Retrieval Engine: single best match by cosine similarity
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use super::vector::{best_match, dot, normalize};
use crate::embedding::Encoder;
use crate::errors::{QaError, Result};
use crate::knowledge::KnowledgeBase;

/// Stored questions encoded per encoder call while building the cache
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Best stored answer for a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    /// Cosine similarity in [-1, 1]
    pub score: f32,
    /// Position of the matched pair in the knowledge base
    pub index: usize,
    /// The stored question that matched
    pub question: String,
}

/// Unit-length vectors, index-aligned with the knowledge base
#[derive(Debug, Clone)]
pub struct RepresentationCache {
    vectors: Vec<Vec<f32>>,
    dimension: usize,
}

impl RepresentationCache {
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }
}

/// Matches queries against a fixed knowledge base.
///
/// The representation cache is filled at most once per engine. Concurrent
/// first calls are serialized by `init_lock`; once filled, queries read
/// the cache without locking. A failed fill leaves the cache empty.
pub struct RetrievalEngine<E: Encoder> {
    knowledge_base: KnowledgeBase,
    encoder: E,
    batch_size: usize,
    cache: OnceLock<RepresentationCache>,
    init_lock: Mutex<()>,
}

impl<E: Encoder> RetrievalEngine<E> {
    /// Create an engine that builds its cache on first query
    pub fn new(knowledge_base: KnowledgeBase, encoder: E) -> Self {
        Self {
            knowledge_base,
            encoder,
            batch_size: DEFAULT_BATCH_SIZE,
            cache: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Create an engine and build its cache immediately
    pub fn eager(knowledge_base: KnowledgeBase, encoder: E) -> Result<Self> {
        let engine = Self::new(knowledge_base, encoder);
        engine.warm()?;
        Ok(engine)
    }

    /// Set how many stored questions go into one encoder call (min 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn is_warm(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Build the representation cache if it is not built yet
    pub fn warm(&self) -> Result<&RepresentationCache> {
        if let Some(cache) = self.cache.get() {
            return Ok(cache);
        }

        // Guards only the fill; the protected state lives in `cache`
        let _guard = self.init_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cache) = self.cache.get() {
            return Ok(cache);
        }

        let cache = self.build_cache()?;
        Ok(self.cache.get_or_init(|| cache))
    }

    fn build_cache(&self) -> Result<RepresentationCache> {
        let start = Instant::now();
        let questions = self.knowledge_base.questions();
        let mut vectors = Vec::with_capacity(questions.len());

        for chunk in questions.chunks(self.batch_size) {
            let encoded = self.encoder.encode_batch(chunk)?;
            if encoded.len() != chunk.len() {
                return Err(QaError::Encoding(format!(
                    "encoder returned {} vectors for {} texts",
                    encoded.len(),
                    chunk.len()
                )));
            }
            vectors.extend(encoded);
        }

        let dimension = vectors.first().map(|v| v.len()).unwrap_or(0);
        for vector in vectors.iter_mut() {
            check_vector(vector, dimension)?;
            normalize(vector);
        }

        tracing::info!(
            model = self.encoder.model_id(),
            questions = vectors.len(),
            dimension,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built representation cache"
        );

        Ok(RepresentationCache { vectors, dimension })
    }

    /// Return the stored answer whose question is most similar to `question`.
    ///
    /// The score is never thresholded; callers decide what a weak match means.
    pub fn answer(&self, question: &str) -> Result<QueryResult> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QaError::EmptyQuery);
        }
        if self.knowledge_base.is_empty() {
            return Err(QaError::EmptyKnowledgeBase);
        }

        let cache = self.warm()?;

        let mut query = self.encoder.encode(question)?;
        check_vector(&query, cache.dimension)?;
        normalize(&mut query);

        let scores: Vec<f32> = cache.vectors.iter().map(|v| dot(&query, v)).collect();
        let (index, score) = best_match(&scores).ok_or_else(|| {
            QaError::Encoding("no finite similarity score".to_string())
        })?;

        let pair = self
            .knowledge_base
            .get(index)
            .ok_or(QaError::EmptyKnowledgeBase)?;

        tracing::debug!(index, score, matched = %pair.question, "Answered query");

        Ok(QueryResult {
            answer: pair.answer.clone(),
            score,
            index,
            question: pair.question.clone(),
        })
    }
}

fn check_vector(vector: &[f32], dimension: usize) -> Result<()> {
    if vector.len() != dimension {
        return Err(QaError::Encoding(format!(
            "vector dimension {} does not match expected {}",
            vector.len(),
            dimension
        )));
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(QaError::Encoding("encoder produced a non-finite value".to_string()));
    }
    Ok(())
}
