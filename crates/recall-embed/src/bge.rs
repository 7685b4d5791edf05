use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use recall_core::error::Error;
use recall_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean;
use crate::tokenize::tokenize_on_device;

/// Local BGE-M3 (XLM-RoBERTa) embedder.
///
/// `model_dir` must contain `tokenizer.json`, `config.json` and `pytorch_model.bin`.
pub struct BgeM3Embedder {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    max_len: usize,
    name: String,
}

impl BgeM3Embedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        if !model_dir.exists() {
            return Err(anyhow!("Could not locate BGE-M3 model directory {}", model_dir.display()));
        }
        let device = select_device();
        info!("Loading BGE-M3 model from {}", model_dir.display());

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let config: XLMRobertaConfig = serde_json::from_str(
            &std::fs::read_to_string(&config_path).with_context(|| format!("reading {}", config_path.display()))?,
        )?;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)
            .with_context(|| format!("reading {}", weights_path.display()))?;
        let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        info!("BGE-M3 model loaded");

        let name = format!("huggingface:{}", model_dir.display());
        Ok(Self { model, tokenizer, device, max_len, name })
    }

    fn forward(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = Tensor::zeros(input_ids.dims(), DType::I64, &self.device)?;
        let hidden = self.model.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = masked_mean(&hidden, &attention_mask)?;
        let emb = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()?;
        debug!("Embedded {} chars in {:?}", text.len(), start.elapsed());
        Ok(emb)
    }
}

impl Embedder for BgeM3Embedder {
    fn name(&self) -> &str { &self.name }

    fn embed(&self, text: &str) -> recall_core::Result<Vec<f32>> {
        self.forward(text).map_err(|e| Error::Embedding(e.to_string()))
    }
}
