use anyhow::{ensure, Result};
use candle_core::{DType, Tensor};

/// Sentence vectors from token states: mean over unmasked positions, then L2.
///
/// `hidden` is `[B, T, H]`, `attention_mask` is `[B, T]`; returns `[B, H]`.
/// A row whose mask is all zero pools to the zero vector.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, _seq, hidden_dim) = match hidden.dims() {
        [b, t, h] => (*b, *t, *h),
        other => anyhow::bail!("token states must be [B,T,H], got {:?}", other),
    };
    ensure!(attention_mask.dims().len() == 2, "attention mask must be [B,T], got {:?}", attention_mask.dims());

    let weights = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let summed = hidden.broadcast_mul(&weights.unsqueeze(2)?)?.sum(1)?;
    let counts = weights.sum_keepdim(1)?.maximum(1.0)?;
    let pooled = summed.broadcast_div(&counts)?;

    let floor = if hidden.dtype() == DType::F16 { 1e-6 } else { 1e-12 };
    let norms = pooled.sqr()?.sum_keepdim(1)?.sqrt()?.maximum(floor)?;
    let unit = pooled.broadcast_div(&norms)?;
    ensure!(unit.dims() == [batch, hidden_dim], "pooled shape {:?}", unit.dims());
    Ok(unit)
}
