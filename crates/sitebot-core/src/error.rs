use thiserror::Error;

use crate::types::ChunkId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Duplicate chunk id: {0}")]
    DuplicateChunkId(ChunkId),

    #[error("Collection already exists: {0}")]
    DuplicateCollection(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Sequence index {index} for source '{source_id}' is not after the stored chunks")]
    SequenceConflict { source_id: String, index: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
