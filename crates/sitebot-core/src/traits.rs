use crate::error::Result;
use crate::types::{Chunk, Embedding, QueryHit};

/// Text to vector function. May be slow and may fail; failures are reported as
/// `Error::EmbeddingUnavailable`.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the model, e.g. `hash:d384`.
    fn embedder_id(&self) -> &str;
    /// Dimensionality of every vector this embedder returns.
    fn dim(&self) -> usize;
    /// One vector per input, in input order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>>;
}

/// An append-only set of chunk records searchable by vector similarity.
pub trait VectorCollection: Send + Sync {
    fn name(&self) -> &str;
    /// Append a batch atomically; a rejected batch changes nothing.
    ///
    /// Errors: `DimensionMismatch` when an embedding disagrees with the
    /// collection's dimensionality, `DuplicateChunkId`, `SequenceConflict` when
    /// a source's indices do not increase, and `InvalidConfiguration` when the
    /// batch would fix the dimensionality at zero.
    fn insert(&self, records: Vec<(Chunk, Embedding)>) -> Result<()>;
    /// Like [`insert`](Self::insert) for chunks of one source, numbering them
    /// from that source's next free sequence index under the same lock that
    /// applies the batch. Returns the first index assigned.
    fn insert_numbered(&self, source_id: &str, records: Vec<(Chunk, Embedding)>) -> Result<usize>;
    fn query(&self, query_vec: &[f32], k: usize) -> Result<Vec<QueryHit>>;
    /// First unused sequence index for `source_id`.
    fn next_sequence_index(&self, source_id: &str) -> usize;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Embedder + ?Sized> Embedder for std::sync::Arc<T> {
    fn embedder_id(&self) -> &str {
        (**self).embedder_id()
    }
    fn dim(&self) -> usize {
        (**self).dim()
    }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        (**self).embed_batch(texts)
    }
}
