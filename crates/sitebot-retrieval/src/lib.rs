//! sitebot-retrieval
//!
//! Sequences Chunker -> Embedder -> VectorCollection for ingestion and
//! Embedder -> VectorCollection for questions. The engine owns no data; the
//! chunk records live in the collection it holds a handle to.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use sitebot_core::chunker::ChunkingConfig;
use sitebot_core::traits::{Embedder, VectorCollection};
use sitebot_core::types::{Chunk, Embedding, IngestReport, QueryHit};
use sitebot_core::{Error, Result};
use sitebot_vector::{MemoryCollection, MemoryVectorStore};

pub struct RetrievalEngine<C: VectorCollection> {
    collection: Arc<C>,
    embedder: Arc<dyn Embedder>,
    chunking: ChunkingConfig,
}

impl RetrievalEngine<MemoryCollection> {
    /// Engine over collection `name` of `store`, creating it on first use.
    pub fn in_store(
        store: &MemoryVectorStore,
        name: &str,
        embedder: Arc<dyn Embedder>,
        chunking: ChunkingConfig,
    ) -> Result<Self> {
        chunking.validate()?;
        let collection = store.get_or_create_collection(name)?;
        Self::new(collection, embedder, chunking)
    }
}

impl<C: VectorCollection> RetrievalEngine<C> {
    pub fn new(collection: Arc<C>, embedder: Arc<dyn Embedder>, chunking: ChunkingConfig) -> Result<Self> {
        chunking.validate()?;
        Ok(Self { collection, embedder, chunking })
    }

    pub fn collection(&self) -> &Arc<C> { &self.collection }

    pub fn chunking(&self) -> ChunkingConfig { self.chunking }

    /// Chunk `text`, embed every chunk in one batch and store the batch.
    ///
    /// Either every chunk of the document is stored or none is. An empty
    /// document is a successful no-op that never reaches the embedder.
    pub fn ingest(&self, text: &str, source_id: &str) -> Result<IngestReport> {
        let started = Instant::now();
        let windows = self.chunking.chunk(text)?;
        if windows.is_empty() {
            debug!(source_id, "empty document, nothing to ingest");
            return Ok(IngestReport { source_id: source_id.to_string(), chunks: 0, first_sequence_index: None });
        }

        let texts: Vec<String> = windows.iter().map(|w| w.to_string()).collect();
        let embeddings = self.embed(&texts)?;
        let records: Vec<(Chunk, Embedding)> =
            texts.into_iter().map(|t| Chunk::new(source_id, 0, t)).zip(embeddings).collect();
        let chunks = records.len();

        let first = self.collection.insert_numbered(source_id, records)?;
        info!(
            source_id,
            chunks,
            first_sequence_index = first,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ingested document"
        );
        Ok(IngestReport { source_id: source_id.to_string(), chunks, first_sequence_index: Some(first) })
    }

    /// Texts of the `k` chunks most similar to `question`, best first.
    pub fn query(&self, question: &str, k: usize) -> Result<Vec<String>> {
        Ok(self.query_hits(question, k)?.into_iter().map(|h| h.chunk.text).collect())
    }

    /// Like [`query`](Self::query) but keeps chunk metadata and scores.
    pub fn query_hits(&self, question: &str, k: usize) -> Result<Vec<QueryHit>> {
        if k == 0 {
            return Err(Error::InvalidQuery("k must be positive".to_string()));
        }
        let started = Instant::now();
        let query_vec = self
            .embed(&[question.to_string()])?
            .pop()
            .ok_or_else(|| Error::EmbeddingUnavailable("no vector for query".to_string()))?;
        let hits = self.collection.query(&query_vec, k)?;
        debug!(
            collection = self.collection.name(),
            k,
            hits = hits.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query answered"
        );
        Ok(hits)
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let vectors = self.embedder.embed_batch(texts).map_err(|e| {
            warn!(embedder = self.embedder.embedder_id(), error = %e, "embedding failed");
            match e {
                Error::EmbeddingUnavailable(_) => e,
                other => Error::EmbeddingUnavailable(other.to_string()),
            }
        })?;
        if vectors.len() != texts.len() {
            return Err(Error::EmbeddingUnavailable(format!(
                "embedder returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}
