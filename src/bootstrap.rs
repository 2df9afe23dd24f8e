//! Startup wiring
//!
//! Loads the knowledge base and builds the configured encoder, engine
//! and responder from a validated `Config`.

use crate::cli::Config;
use crate::embedding::Encoder;
use crate::errors::Result;
use crate::knowledge::{LoadReport, Loader};
use crate::retrieval::RetrievalEngine;
use crate::responder::Responder;

/// Builder for the question-answering stack
pub struct Bootstrap {
    config: Config,
}

impl Bootstrap {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the knowledge base with the configured malformed-line policy
    pub fn load_knowledge(&self) -> Result<LoadReport> {
        Loader::new(self.config.knowledge.on_malformed).load(self.config.knowledge_path())
    }

    /// Build a lazy responder; call `engine().warm()` to prebuild the cache
    pub fn build_responder(&self, report: LoadReport) -> Result<Responder<Box<dyn Encoder>>> {
        let encoder = self.config.encoder.build()?;
        tracing::debug!(model = encoder.model_id(), dim = encoder.dimension(), "Encoder ready");

        let engine = RetrievalEngine::new(report.knowledge_base, encoder)
            .with_batch_size(self.config.retrieval.batch_size);

        Ok(Responder::new(engine)
            .with_min_confidence(self.config.responder.min_confidence)
            .with_fallback_message(self.config.responder.fallback_message.clone()))
    }
}
