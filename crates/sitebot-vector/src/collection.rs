use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use sitebot_core::traits::VectorCollection;
use sitebot_core::types::{Chunk, ChunkId, Embedding, QueryHit};
use sitebot_core::{Error, Result};

use crate::similarity::{cosine_with_magnitude, magnitude};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub name: String,
    pub chunks: usize,
    pub sources: usize,
    pub dimension: Option<usize>,
}

struct StoredRecord {
    chunk: Chunk,
    embedding: Embedding,
    magnitude: f64,
}

#[derive(Default)]
struct CollectionState {
    records: Vec<StoredRecord>,
    ids: HashSet<ChunkId>,
    /// Fixed by the first non-empty insert.
    dimension: Option<usize>,
    /// Largest stored sequence index per source.
    last_sequence: HashMap<String, usize>,
}

/// In-memory, append-only chunk collection with exact cosine search.
///
/// Inserts validate the whole batch before touching the stored state and apply
/// it under one write lock, so readers see either none or all of a batch.
pub struct MemoryCollection {
    name: String,
    state: RwLock<CollectionState>,
}

impl std::fmt::Debug for MemoryCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("MemoryCollection")
            .field("name", &self.name)
            .field("chunks", &state.records.len())
            .field("dimension", &state.dimension)
            .finish()
    }
}

impl MemoryCollection {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), state: RwLock::new(CollectionState::default()) }
    }

    pub fn dimension(&self) -> Option<usize> {
        self.read().dimension
    }

    pub fn stats(&self) -> CollectionStats {
        let state = self.read();
        CollectionStats {
            name: self.name.clone(),
            chunks: state.records.len(),
            sources: state.last_sequence.len(),
            dimension: state.dimension,
        }
    }

    /// Chunks of one source in sequence order.
    pub fn chunks_for_source(&self, source_id: &str) -> Vec<Chunk> {
        let state = self.read();
        let mut chunks: Vec<Chunk> = state
            .records
            .iter()
            .filter(|r| r.chunk.source_id == source_id)
            .map(|r| r.chunk.clone())
            .collect();
        chunks.sort_by_key(|c| c.sequence_index);
        chunks
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().ids.contains(id)
    }

    /// Validate `records` against `state` and append them. `records` is non-empty.
    fn apply(&self, state: &mut CollectionState, records: Vec<(Chunk, Embedding)>) -> Result<()> {
        let first_len = records.first().map_or(0, |(_, e)| e.len());
        let expected = state.dimension.unwrap_or(first_len);
        if expected == 0 {
            return Err(Error::InvalidConfiguration("embeddings must not be empty".to_string()));
        }
        validate_batch(state, &records, expected)?;

        let count = records.len();
        state.dimension = Some(expected);
        state.records.reserve(count);
        for (chunk, embedding) in records {
            state.ids.insert(chunk.id.clone());
            state.last_sequence.insert(chunk.source_id.clone(), chunk.sequence_index);
            let mag = magnitude(&embedding);
            state.records.push(StoredRecord { chunk, embedding, magnitude: mag });
        }
        debug!(collection = %self.name, inserted = count, total = state.records.len(), "inserted chunks");
        Ok(())
    }

    // Writers never leave a half-applied batch behind, so a poisoned lock
    // still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, CollectionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CollectionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn next_sequence(state: &CollectionState, source_id: &str) -> usize {
    state.last_sequence.get(source_id).map_or(0, |last| last + 1)
}

/// Descending score, then ascending sequence index, then ascending id.
fn rank_order(a: &(f32, &StoredRecord), b: &(f32, &StoredRecord)) -> Ordering {
    b.0.total_cmp(&a.0)
        .then_with(|| a.1.chunk.sequence_index.cmp(&b.1.chunk.sequence_index))
        .then_with(|| a.1.chunk.id.cmp(&b.1.chunk.id))
}

fn validate_batch(state: &CollectionState, records: &[(Chunk, Embedding)], expected: usize) -> Result<()> {
    let mut batch_ids: HashSet<&str> = HashSet::with_capacity(records.len());
    let mut batch_sequence: HashMap<&str, usize> = HashMap::new();
    for (chunk, embedding) in records {
        if embedding.len() != expected {
            return Err(Error::DimensionMismatch { expected, actual: embedding.len() });
        }
        if state.ids.contains(&chunk.id) || !batch_ids.insert(chunk.id.as_str()) {
            return Err(Error::DuplicateChunkId(chunk.id.clone()));
        }
        let source = chunk.source_id.as_str();
        let previous = batch_sequence.get(source).or_else(|| state.last_sequence.get(source));
        if previous.is_some_and(|&prev| chunk.sequence_index <= prev) {
            return Err(Error::SequenceConflict { source_id: chunk.source_id.clone(), index: chunk.sequence_index });
        }
        batch_sequence.insert(source, chunk.sequence_index);
    }
    Ok(())
}

impl VectorCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(&self, records: Vec<(Chunk, Embedding)>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut state = self.write();
        self.apply(&mut state, records)
    }

    fn insert_numbered(&self, source_id: &str, mut records: Vec<(Chunk, Embedding)>) -> Result<usize> {
        let mut state = self.write();
        let first = next_sequence(&state, source_id);
        if records.is_empty() {
            return Ok(first);
        }
        for (offset, (chunk, _)) in records.iter_mut().enumerate() {
            chunk.source_id = source_id.to_string();
            chunk.sequence_index = first + offset;
        }
        self.apply(&mut state, records)?;
        Ok(first)
    }

    fn query(&self, query_vec: &[f32], k: usize) -> Result<Vec<QueryHit>> {
        if k == 0 {
            return Err(Error::InvalidQuery("k must be positive".to_string()));
        }
        let state = self.read();
        if state.records.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(expected) = state.dimension {
            if query_vec.len() != expected {
                return Err(Error::DimensionMismatch { expected, actual: query_vec.len() });
            }
        }

        let query_mag = magnitude(query_vec);
        let mut scored: Vec<(f32, &StoredRecord)> = state
            .records
            .iter()
            .map(|r| {
                let score = cosine_with_magnitude(query_vec, query_mag, &r.embedding, r.magnitude);
                // Non-finite input ranks last.
                (if score.is_nan() { -1.0 } else { score }, r)
            })
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, rank_order);
            scored.truncate(k);
        }
        scored.sort_by(rank_order);

        Ok(scored.into_iter().map(|(score, r)| QueryHit { chunk: r.chunk.clone(), score }).collect())
    }

    fn next_sequence_index(&self, source_id: &str) -> usize {
        next_sequence(&self.read(), source_id)
    }

    fn len(&self) -> usize {
        self.read().records.len()
    }
}
