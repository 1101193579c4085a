//! Similarity metric used by every collection.
//!
//! Cosine similarity in `[-1, 1]`; vector magnitude carries no meaning for
//! sentence embeddings, so vectors are compared by direction only. A vector
//! with zero magnitude scores 0.0 against everything.
//!
//! Sums are accumulated in f64 so finite f32 components at either end of the
//! range neither overflow nor flush to zero.

pub fn magnitude(v: &[f32]) -> f64 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt()
}

/// Cosine similarity with the query magnitude precomputed once per query.
pub fn cosine_with_magnitude(query: &[f32], query_mag: f64, stored: &[f32], stored_mag: f64) -> f32 {
    if query_mag == 0.0 || stored_mag == 0.0 {
        return 0.0;
    }
    let dot: f64 = query.iter().zip(stored).map(|(&a, &b)| f64::from(a) * f64::from(b)).sum();
    // Each magnitude is divided separately; their product can leave f64 range.
    ((dot / query_mag) / stored_mag).clamp(-1.0, 1.0) as f32
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    cosine_with_magnitude(a, magnitude(a), b, magnitude(b))
}
