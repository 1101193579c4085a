//! sitebot-embed
//!
//! Embedders for the retrieval engine: a deterministic hashing embedder for
//! tests and offline runs, the local MiniLM sentence model, and a bounded
//! content-hash cache that wraps either.

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use sitebot_core::config::{expand_path, EmbedderSettings};
use sitebot_core::traits::Embedder;

pub mod cache;
pub mod device;
pub mod hash;
pub mod model;
pub mod pool;
pub mod tokenize;

pub use cache::{CacheStats, CachedEmbedder};
pub use hash::HashEmbedder;
pub use model::{resolve_model_dir, MiniLmEmbedder, MINILM_DIM};
pub use pool::masked_mean_l2;

fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// Build the embedder described by `settings`.
///
/// `APP_USE_FAKE_EMBEDDINGS=1` forces the hashing embedder regardless of `kind`.
pub fn embedder_from_settings(settings: &EmbedderSettings) -> Result<Arc<dyn Embedder>> {
    let kind = if use_fake_embeddings() { "hash" } else { settings.kind.as_str() };
    let base: Arc<dyn Embedder> = match kind {
        "hash" | "fake" => {
            info!(dim = settings.dim, "using hash embedder");
            Arc::new(HashEmbedder::new(settings.dim)?)
        }
        "minilm" => {
            let configured: Option<PathBuf> = settings.model_dir.as_deref().map(expand_path);
            let dir = resolve_model_dir(configured.as_deref())?;
            Arc::new(MiniLmEmbedder::load(&dir)?)
        }
        other => bail!("unknown embedder kind '{}'", other),
    };
    if settings.cache_capacity == 0 { return Ok(base); }
    Ok(Arc::new(CachedEmbedder::new(base, settings.cache_capacity)))
}
