// Sentence embeddings from a local BERT model via Candle
use anyhow::{Context, Result as AnyResult};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};

use super::Encoder;
use crate::errors::{QaError, Result};

pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_REVISION: &str = "main";
const MAX_SEQUENCE_LEN: usize = 256;

/// BERT sentence encoder (mean pooled over the attention mask).
///
/// Candle tensors are immutable and the forward pass takes `&self`, so a
/// single instance can serve concurrent callers.
pub struct BertEncoder {
    model: Arc<BertModel>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
    dimension: usize,
    model_id: String,
}

impl BertEncoder {
    /// Default model at the default revision (downloads on first use)
    pub fn new() -> Result<Self> {
        Self::from_hub(DEFAULT_MODEL_ID, DEFAULT_REVISION)
    }

    /// Load `model_id` pinned at `revision` from the HuggingFace Hub cache
    pub fn from_hub(model_id: &str, revision: &str) -> Result<Self> {
        Self::load(model_id, revision).map_err(|e| QaError::Encoding(format!("{:#}", e)))
    }

    fn load(model_id: &str, revision: &str) -> AnyResult<Self> {
        let device = Device::Cpu;

        let api = Api::new().context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::with_revision(
            model_id.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));

        let config_path = repo.get("config.json")
            .context("Failed to download model config")?;
        let tokenizer_path = repo.get("tokenizer.json")
            .context("Failed to download tokenizer")?;
        let weights_path = repo.get("model.safetensors")
            .context("Failed to download model weights")?;

        let config_contents = std::fs::read_to_string(config_path)
            .context("Failed to read model config")?;
        let config: Config = serde_json::from_str(&config_contents)
            .context("Failed to parse model config")?;
        let dimension = serde_json::from_str::<serde_json::Value>(&config_contents)?
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .context("Model config has no hidden_size")? as usize;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        // Padding is applied by hand below so single and batched calls agree
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .context("Failed to load model weights")?
        };
        let model = BertModel::load(vb, &config)
            .context("Failed to create BERT model")?;

        tracing::info!(model = model_id, revision, dim = dimension, "Loaded embedding model");

        Ok(Self {
            model: Arc::new(model),
            tokenizer: Arc::new(tokenizer),
            device,
            dimension,
            model_id: format!("{}@{}", model_id, revision),
        })
    }

    fn forward(&self, texts: &[&str]) -> AnyResult<Vec<Vec<f32>>> {
        let encodings = self.tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let max_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
        let batch_size = texts.len();

        let mut flat_ids = vec![0u32; batch_size * max_len];
        let mut flat_mask = vec![0u32; batch_size * max_len];
        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let row = i * max_len;
            flat_ids[row..row + ids.len()].copy_from_slice(ids);
            flat_mask[row..row + mask.len()].copy_from_slice(mask);
        }

        let token_ids = Tensor::from_vec(flat_ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(flat_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = token_ids.zeros_like()?;

        let hidden = self.model.forward(&token_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = Self::mean_pool(&hidden, &attention_mask)?;

        Ok(pooled.to_vec2::<f32>()?)
    }

    /// Mean pooling with attention mask
    fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> AnyResult<Tensor> {
        let mask = attention_mask
            .unsqueeze(2)?
            .expand(hidden.shape())?
            .to_dtype(hidden.dtype())?;

        let summed = (hidden * &mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;

        Ok(summed.broadcast_div(&counts)?)
    }
}

impl Encoder for BertEncoder {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.forward(texts)
            .map_err(|e| QaError::Encoding(format!("{}: {:#}", self.model_id, e)))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::vector::{dot, normalize};

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_embedding_dimension() {
        let encoder = BertEncoder::new().expect("Failed to create encoder");
        assert_eq!(encoder.dimension(), 384);
        let v = encoder.encode("Hello world").expect("Failed to encode");
        assert_eq!(v.len(), 384);
    }

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_batch_matches_single() {
        let encoder = BertEncoder::new().expect("Failed to create encoder");
        let batch = encoder
            .encode_batch(&["What is GDPR?", "Tell me about the ISO 27001 certification process"])
            .expect("Failed to encode batch");
        let single = encoder.encode("What is GDPR?").expect("Failed to encode");

        let mut a = batch[0].clone();
        let mut b = single;
        normalize(&mut a);
        normalize(&mut b);
        assert!(dot(&a, &b) > 0.9999);
    }

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_empty_batch() {
        let encoder = BertEncoder::new().expect("Failed to create encoder");
        assert!(encoder.encode_batch(&[]).unwrap().is_empty());
    }
}
