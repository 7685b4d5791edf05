use anyhow::Result;
use candle_core::Tensor;

/// Mean of the hidden states over unmasked tokens: `[B,T,H]` x `[B,T]` -> `[B,H]`.
///
/// No normalization is applied here; cosine-mode callers normalize afterwards.
pub fn masked_mean(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let dims = hidden.dims();
    anyhow::ensure!(dims.len() == 3, "hidden shape must be [B,T,H], got {:?}", dims);
    let batch = dims[0];
    let hidden_dim = dims[2];

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_broadcast = mask.unsqueeze(2)?.broadcast_as(hidden.shape())?;
    let masked = (hidden * &mask_broadcast)?;
    let sum = masked.sum(1)?;
    let lengths = mask.sum(1)?.unsqueeze(1)?.to_dtype(sum.dtype())?;
    let mean = sum.broadcast_div(&lengths)?;
    anyhow::ensure!(mean.dims() == [batch, hidden_dim].as_slice(), "unexpected pooled shape {:?}", mean.dims());
    Ok(mean)
}
