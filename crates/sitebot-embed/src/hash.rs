use std::hash::Hasher;
use twox_hash::XxHash64;

use sitebot_core::traits::Embedder;
use sitebot_core::types::Embedding;
use sitebot_core::{Error, Result};

const BUCKETS_PER_TOKEN: u64 = 4;

/// Deterministic feature-hashing embedder.
///
/// Every whitespace token is hashed into a few signed buckets and the result
/// is L2-normalised. Identical texts always map to identical vectors, which is
/// all the tests and offline runs need.
pub struct HashEmbedder {
    dim: usize,
    id: String,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 { return Err(Error::InvalidConfiguration("embedding dimension must be positive".to_string())); }
        Ok(Self { dim, id: format!("hash:d{dim}") })
    }

    pub fn embed_text(&self, text: &str) -> Embedding {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            for seed in 0..BUCKETS_PER_TOKEN {
                let mut hasher = XxHash64::with_seed(seed);
                hasher.write(token.as_bytes());
                let h = hasher.finish();
                let idx = (h % self.dim as u64) as usize;
                let sign = if h >> 63 == 1 { -1.0 } else { 1.0 };
                v[idx] += sign;
            }
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 { for x in &mut v { *x /= norm; } }
        v
    }
}

impl Embedder for HashEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
