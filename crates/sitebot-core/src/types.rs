//! Domain types shared by the chunker, the vector store and the engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ChunkId = String;
pub type Embedding = Vec<f32>;

/// A window of a source document that is embedded and stored independently.
///
/// - `id`: globally unique chunk identifier, assigned at creation
/// - `source_id`: name of the document the text came from
/// - `sequence_index`: position within the document's chunk sequence
/// - `text`: the window content, never empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub source_id: String,
    pub sequence_index: usize,
    pub text: String,
}

impl Chunk {
    /// Create a chunk with a fresh random id.
    pub fn new(source_id: impl Into<String>, sequence_index: usize, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_id: source_id.into(),
            sequence_index,
            text: text.into(),
        }
    }
}

/// One ranked result of a similarity query.
///
/// `score` is the cosine similarity between the query vector and the stored
/// embedding; higher is always better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHit {
    pub chunk: Chunk,
    pub score: f32,
}

/// Outcome of a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub source_id: String,
    pub chunks: usize,
    pub first_sequence_index: Option<usize>,
}
