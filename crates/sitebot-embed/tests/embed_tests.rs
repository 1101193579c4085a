use std::sync::atomic::{AtomicUsize, Ordering};

use sitebot_core::config::EmbedderSettings;
use sitebot_core::traits::Embedder;
use sitebot_core::types::Embedding;
use sitebot_core::{Error, Result};
use sitebot_embed::{embedder_from_settings, CachedEmbedder, HashEmbedder};

#[test]
fn hash_embedder_shapes_and_determinism() {
    let embedder = HashEmbedder::new(384).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string(), "bridge abutment".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    assert_eq!(embs.len(), 3);
    assert_eq!(embs[0].len(), 384, "embedding dim is 384");

    let norm: f32 = embs[0].iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in embs[0].iter().zip(embs[1].iter()) { assert!((a - b).abs() <= 1e-6); }
    assert_ne!(embs[0], embs[2]);
}

#[test]
fn hash_embedder_maps_blank_text_to_zero_vector() {
    let embedder = HashEmbedder::new(16).unwrap();
    let v = embedder.embed_text("   ");
    assert!(v.iter().all(|x| *x == 0.0));
    assert!(matches!(HashEmbedder::new(0), Err(Error::InvalidConfiguration(_))));
}

#[test]
fn settings_select_hash_embedder_with_cache() {
    let settings = EmbedderSettings { kind: "hash".to_string(), dim: 64, model_dir: None, cache_capacity: 8 };
    let embedder = embedder_from_settings(&settings).expect("embedder");
    assert_eq!(embedder.dim(), 64);
    assert_eq!(embedder.embedder_id(), "hash:d64");
}

#[test]
fn unknown_kind_is_rejected() {
    let settings = EmbedderSettings { kind: "word2vec".to_string(), ..Default::default() };
    // APP_USE_FAKE_EMBEDDINGS is never set by this test binary.
    assert!(embedder_from_settings(&settings).is_err());
}

struct CountingEmbedder {
    inner: HashEmbedder,
    texts_seen: AtomicUsize,
}

impl Embedder for CountingEmbedder {
    fn embedder_id(&self) -> &str { self.inner.embedder_id() }
    fn dim(&self) -> usize { self.inner.dim() }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.texts_seen.fetch_add(texts.len(), Ordering::SeqCst);
        self.inner.embed_batch(texts)
    }
}

fn counting() -> CountingEmbedder {
    CountingEmbedder { inner: HashEmbedder::new(32).unwrap(), texts_seen: AtomicUsize::new(0) }
}

#[test]
fn cache_serves_repeats_without_calling_inner() {
    let cached = CachedEmbedder::new(counting(), 16);
    let first = cached.embed_batch(&["deck".to_string(), "pier".to_string()]).unwrap();
    let second = cached.embed_batch(&["pier".to_string(), "girder".to_string(), "deck".to_string()]).unwrap();

    assert_eq!(second[0], first[1]);
    assert_eq!(second[2], first[0]);
    let stats = cached.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.entries, 3);
}

#[test]
fn cache_evicts_least_recently_used() {
    let cached = CachedEmbedder::new(counting(), 2);
    cached.embed_batch(&["a".to_string()]).unwrap();
    cached.embed_batch(&["b".to_string()]).unwrap();
    cached.embed_batch(&["a".to_string()]).unwrap(); // touch a
    cached.embed_batch(&["c".to_string()]).unwrap(); // evicts b
    assert_eq!(cached.stats().entries, 2);

    let before = cached.stats().misses;
    cached.embed_batch(&["a".to_string()]).unwrap();
    assert_eq!(cached.stats().misses, before, "a is still cached");
    cached.embed_batch(&["b".to_string()]).unwrap();
    assert_eq!(cached.stats().misses, before + 1, "b was evicted");
}

#[test]
fn zero_capacity_disables_cache() {
    let cached = CachedEmbedder::new(counting(), 0);
    cached.embed_batch(&["x".to_string()]).unwrap();
    cached.embed_batch(&["x".to_string()]).unwrap();
    assert_eq!(cached.stats(), Default::default());
}
