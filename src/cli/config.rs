//! Configuration management for kbqa
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.kbqa/config.toml

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::embedding::{bert, hashing, BertEncoder, Encoder, HashingEncoder};
use crate::errors::{QaError, Result};
use crate::knowledge::MalformedLinePolicy;
use crate::responder::DEFAULT_FALLBACK_MESSAGE;
use crate::retrieval::DEFAULT_BATCH_SIZE;

/// Complete configuration for kbqa
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub responder: ResponderConfig,
}

/// Knowledge base source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub path: String,
    pub on_malformed: MalformedLinePolicy,
}

/// Which encoder backend to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EncoderBackend {
    /// Sentence-transformer BERT model via Candle
    #[default]
    Bert,
    /// Offline feature hashing
    Hashing,
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub backend: EncoderBackend,
    pub model_id: String,
    pub revision: String,
    pub hashing_dimension: usize,
}

/// Retrieval engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Build the representation cache at startup instead of on first query
    pub eager: bool,
    pub batch_size: usize,
}

/// Caller-side reply policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    pub min_confidence: Option<f32>,
    pub fallback_message: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: "data/knowledge_base.jsonl".to_string(),
            on_malformed: MalformedLinePolicy::Abort,
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            backend: EncoderBackend::Bert,
            model_id: bert::DEFAULT_MODEL_ID.to_string(),
            revision: bert::DEFAULT_REVISION.to_string(),
            hashing_dimension: hashing::DEFAULT_DIMENSION,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            eager: true,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            min_confidence: None,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl EncoderConfig {
    /// Construct the configured encoder
    pub fn build(&self) -> Result<Box<dyn Encoder>> {
        match self.backend {
            EncoderBackend::Bert => Ok(Box::new(BertEncoder::from_hub(
                &self.model_id,
                &self.revision,
            )?)),
            EncoderBackend::Hashing => Ok(Box::new(HashingEncoder::new(self.hashing_dimension)?)),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| QaError::Config(format!("Failed to read config {}: {}", path.display(), e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| QaError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// ~/.kbqa/config.toml, when a home directory exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".kbqa").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.knowledge.path.trim().is_empty() {
            return Err(QaError::Config("knowledge.path must not be empty".to_string()));
        }

        if self.retrieval.batch_size == 0 {
            return Err(QaError::Config(
                "retrieval.batch_size must be greater than 0".to_string()
            ));
        }

        if self.encoder.backend == EncoderBackend::Hashing && self.encoder.hashing_dimension == 0 {
            return Err(QaError::Config(
                "encoder.hashing_dimension must be greater than 0".to_string()
            ));
        }

        if self.encoder.backend == EncoderBackend::Bert && self.encoder.model_id.trim().is_empty() {
            return Err(QaError::Config("encoder.model_id must not be empty".to_string()));
        }

        if let Some(min) = self.responder.min_confidence {
            if !(-1.0..=1.0).contains(&min) {
                return Err(QaError::Config(
                    "responder.min_confidence must be between -1.0 and 1.0".to_string()
                ));
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| QaError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| QaError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| QaError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Knowledge base path with `~/` expanded
    pub fn knowledge_path(&self) -> PathBuf {
        Self::expand_path(&self.knowledge.path)
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.knowledge.on_malformed, MalformedLinePolicy::Abort);
        assert_eq!(config.encoder.backend, EncoderBackend::Bert);
        assert_eq!(config.encoder.model_id, "sentence-transformers/all-MiniLM-L6-v2");
        assert!(config.retrieval.eager);
        assert!(config.responder.min_confidence.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_batch_size() {
        let mut config = Config::default();
        config.retrieval.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_min_confidence() {
        let mut config = Config::default();
        config.responder.min_confidence = Some(1.5);
        assert!(config.validate().is_err());

        config.responder.min_confidence = Some(0.4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_hashing_dimension() {
        let mut config = Config::default();
        config.encoder.backend = EncoderBackend::Hashing;
        config.encoder.hashing_dimension = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [knowledge]
            path = "kb.jsonl"
            on_malformed = "skip"

            [encoder]
            backend = "hashing"
            "#,
        )
        .unwrap();

        assert_eq!(config.knowledge.path, "kb.jsonl");
        assert_eq!(config.knowledge.on_malformed, MalformedLinePolicy::Skip);
        assert_eq!(config.encoder.backend, EncoderBackend::Hashing);
        assert_eq!(config.encoder.hashing_dimension, 1024);
        assert_eq!(config.retrieval.batch_size, 32);
    }

    #[test]
    fn test_save_and_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.responder.min_confidence = Some(0.35);
        config.save(&path).unwrap();

        let loaded = Config::load(Some(path)).unwrap();
        assert_eq!(loaded.responder.min_confidence, Some(0.35));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = Config::load(Some(PathBuf::from("/nonexistent/kbqa.toml"))).unwrap_err();
        assert!(matches!(err, QaError::Config(_)));
    }

    #[test]
    fn test_build_hashing_encoder() {
        let mut config = EncoderConfig::default();
        config.backend = EncoderBackend::Hashing;
        config.hashing_dimension = 128;
        let encoder = config.build().unwrap();
        assert_eq!(encoder.dimension(), 128);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path("~/.kbqa/kb.jsonl");
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let expanded = Config::expand_path("/absolute/path");
        assert_eq!(expanded.to_string_lossy(), "/absolute/path");
    }
}
