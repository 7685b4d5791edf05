use anyhow::{Result, anyhow};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Encode `text` into `[1, T]` id and attention-mask tensors, truncated to `max_len`.
pub fn tokenize_on_device(tokenizer: &Tokenizer, text: &str, max_len: usize, device: &Device) -> Result<(Tensor, Tensor)> {
    let enc = tokenizer.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let mut ids = enc.get_ids().to_vec();
    let mut mask = enc.get_attention_mask().to_vec();
    if ids.len() > max_len { ids.truncate(max_len); mask.truncate(max_len); }
    if ids.is_empty() { return Err(anyhow!("Tokenizer produced no tokens")); }
    let len = ids.len();
    let input_ids = Tensor::from_iter(ids, device)?.reshape((1, len))?;
    let attention_mask = Tensor::from_iter(mask, device)?.reshape((1, len))?;
    Ok((input_ids, attention_mask))
}
