//! Fixed-stride overlapping windows over document text.
//!
//! Sizes and offsets count characters (Unicode scalar values), never bytes, so
//! a window can not split a code point. Windows start at `0, stride, 2*stride,
//! ...` where `stride = size - overlap`, and the last one is clipped to the end
//! of the text.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { size: 500, overlap: 50 }
    }
}

impl ChunkingConfig {
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        let config = Self { size, overlap };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate(self.size, self.overlap)
    }

    pub fn stride(&self) -> usize {
        self.size - self.overlap
    }

    pub fn chunk<'a>(&self, text: &'a str) -> Result<Vec<&'a str>> {
        chunk_text(text, self.size, self.overlap)
    }
}

fn validate(size: usize, overlap: usize) -> Result<()> {
    if size == 0 {
        return Err(Error::InvalidConfiguration("chunk size must be positive".to_string()));
    }
    if overlap >= size {
        return Err(Error::InvalidConfiguration(format!(
            "chunk overlap ({overlap}) must be smaller than chunk size ({size})"
        )));
    }
    Ok(())
}

/// Split `text` into windows of at most `size` characters, each starting
/// `size - overlap` characters after the previous one.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Result<Vec<&str>> {
    validate(size, overlap)?;
    let stride = size - overlap;

    // Byte offset of every char boundary, including the end of the text.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let len = bounds.len() - 1;

    let mut windows = Vec::with_capacity(expected_chunk_count(len, size, overlap));
    let mut start = 0usize;
    while start < len {
        let end = (start + size).min(len);
        windows.push(&text[bounds[start]..bounds[end]]);
        start += stride;
    }
    Ok(windows)
}

/// Number of windows `chunk_text` yields for a text of `len` characters.
/// Assumes a valid `(size, overlap)` pair.
pub fn expected_chunk_count(len: usize, size: usize, overlap: usize) -> usize {
    let stride = size.saturating_sub(overlap).max(1);
    len.div_ceil(stride)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousand_chars_make_three_windows() {
        let text = "x".repeat(1000);
        let chunks = chunk_text(&text, 500, 50).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 500);
        assert_eq!(chunks[1].len(), 500);
        assert_eq!(chunks[2].len(), 100);
        assert_eq!(expected_chunk_count(1000, 500, 50), 3);
    }

    #[test]
    fn multibyte_text_is_windowed_by_chars() {
        let text = "héllo wörld ✓✓";
        let chunks = chunk_text(text, 4, 1).unwrap();
        assert_eq!(chunks, vec!["héll", "lo w", "wörl", "ld ✓", "✓✓"]);
    }

    #[test]
    fn rejects_bad_geometry() {
        assert!(matches!(chunk_text("abc", 0, 0), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(chunk_text("abc", 5, 5), Err(Error::InvalidConfiguration(_))));
        assert!(ChunkingConfig::new(10, 2).is_ok());
    }
}
