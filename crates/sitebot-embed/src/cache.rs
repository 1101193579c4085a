//! Bounded in-memory embedding cache keyed by content hash.
//!
//! The cache is consulted prior to calling the wrapped embedder and written
//! through on misses. Keys include the embedder id so vectors from different
//! models never mix. When full, the least recently used entry is evicted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

use sitebot_core::traits::Embedder;
use sitebot_core::types::Embedding;
use sitebot_core::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

struct CacheEntry {
    vector: Embedding,
    last_used: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    tick: u64,
}

impl CacheState {
    fn get(&mut self, key: &str) -> Option<Embedding> {
        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(key).map(|e| { e.last_used = tick; e.vector.clone() })
    }

    fn put(&mut self, key: String, vector: Embedding, capacity: usize) {
        self.tick += 1;
        if !self.entries.contains_key(&key) && self.entries.len() >= capacity {
            if let Some(oldest) = self.entries.iter().min_by_key(|(_, e)| e.last_used).map(|(k, _)| k.clone()) {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(key, CacheEntry { vector, last_used: self.tick });
    }
}

pub struct CachedEmbedder<E> {
    inner: E,
    capacity: usize,
    state: Mutex<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E, capacity: usize) -> Self {
        Self { inner, capacity, state: Mutex::new(CacheState::default()), hits: AtomicU64::new(0), misses: AtomicU64::new(0) }
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.state.lock().map(|s| s.entries.len()).unwrap_or(0);
        CacheStats { hits: self.hits.load(Ordering::Relaxed), misses: self.misses.load(Ordering::Relaxed), entries }
    }

    fn key(&self, text: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.inner.embedder_id().as_bytes());
        hasher.update(&[0]);
        hasher.update(text.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CacheState>> {
        self.state.lock().map_err(|_| Error::EmbeddingUnavailable("embedding cache lock poisoned".to_string()))
    }
}

impl<E: Embedder> Embedder for CachedEmbedder<E> {
    fn embedder_id(&self) -> &str { self.inner.embedder_id() }
    fn dim(&self) -> usize { self.inner.dim() }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if self.capacity == 0 { return self.inner.embed_batch(texts); }

        let keys: Vec<String> = texts.iter().map(|t| self.key(t)).collect();
        let mut vectors: Vec<Option<Embedding>> = {
            let mut state = self.lock()?;
            keys.iter().map(|k| state.get(k)).collect()
        };
        let miss_indices: Vec<usize> = vectors.iter().enumerate().filter(|(_, v)| v.is_none()).map(|(i, _)| i).collect();
        self.hits.fetch_add((texts.len() - miss_indices.len()) as u64, Ordering::Relaxed);
        self.misses.fetch_add(miss_indices.len() as u64, Ordering::Relaxed);

        if !miss_indices.is_empty() {
            let miss_texts: Vec<String> = miss_indices.iter().map(|&i| texts[i].clone()).collect();
            // The wrapped call may be slow; the lock is not held across it.
            let embedded = self.inner.embed_batch(&miss_texts)?;
            if embedded.len() != miss_texts.len() {
                return Err(Error::EmbeddingUnavailable(format!(
                    "embedder returned {} vectors for {} inputs", embedded.len(), miss_texts.len()
                )));
            }
            let mut state = self.lock()?;
            for (&i, v) in miss_indices.iter().zip(embedded) {
                state.put(keys[i].clone(), v.clone(), self.capacity);
                vectors[i] = Some(v);
            }
            debug!(misses = miss_indices.len(), total = texts.len(), "embedding cache filled");
        }

        vectors
            .into_iter()
            .map(|v| v.ok_or_else(|| Error::EmbeddingUnavailable("missing cached vector".to_string())))
            .collect()
    }
}
