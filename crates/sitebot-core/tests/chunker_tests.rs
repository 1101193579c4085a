use sitebot_core::chunker::{chunk_text, expected_chunk_count, ChunkingConfig};
use sitebot_core::Error;

/// Drop the leading overlap of every window after the first and join.
fn reassemble(chunks: &[&str], overlap: usize) -> String {
    let mut out = String::new();
    for (i, c) in chunks.iter().enumerate() {
        if i == 0 {
            out.push_str(c);
        } else {
            out.extend(c.chars().skip(overlap));
        }
    }
    out
}

fn sample_text(len: usize) -> String {
    "The abutment transfers loads from the deck to the foundation. "
        .chars()
        .cycle()
        .take(len)
        .collect()
}

#[test]
fn reassembly_reconstructs_original_text() {
    for len in [1usize, 7, 49, 50, 51, 499, 500, 501, 949, 950, 951, 1000, 2345] {
        for (size, overlap) in [(500, 50), (10, 0), (10, 9), (64, 16), (1, 0)] {
            let text = sample_text(len);
            let chunks = chunk_text(&text, size, overlap).unwrap();
            assert_eq!(reassemble(&chunks, overlap), text, "len={len} size={size} overlap={overlap}");
            assert_eq!(chunks.len(), expected_chunk_count(len, size, overlap));
            assert!(chunks.iter().all(|c| !c.is_empty() && c.chars().count() <= size));
        }
    }
}

#[test]
fn consecutive_windows_share_exactly_the_overlap() {
    let text = sample_text(1200);
    let chunks = chunk_text(&text, 500, 50).unwrap();
    for pair in chunks.windows(2) {
        let prev: Vec<char> = pair[0].chars().collect();
        let tail: String = prev[prev.len() - 50..].iter().collect();
        let head: String = pair[1].chars().take(50).collect();
        assert_eq!(tail, head);
    }
}

#[test]
fn six_hundred_chars_make_two_windows() {
    let text = "AB".repeat(300);
    let chunks = chunk_text(&text, 500, 50).unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], &text[0..500]);
    assert_eq!(chunks[1], &text[450..600]);
}

#[test]
fn empty_text_yields_no_chunks() {
    assert!(chunk_text("", 500, 50).unwrap().is_empty());
    assert_eq!(expected_chunk_count(0, 500, 50), 0);
}

#[test]
fn short_text_yields_itself() {
    let chunks = chunk_text("tiny", 500, 50).unwrap();
    assert_eq!(chunks, vec!["tiny"]);
}

#[test]
fn chunking_is_deterministic() {
    let text = sample_text(3000);
    let config = ChunkingConfig::new(300, 30).unwrap();
    assert_eq!(config.chunk(&text).unwrap(), config.chunk(&text).unwrap());
}

#[test]
fn invalid_geometry_is_rejected() {
    assert!(matches!(ChunkingConfig::new(0, 0), Err(Error::InvalidConfiguration(_))));
    assert!(matches!(ChunkingConfig::new(100, 100), Err(Error::InvalidConfiguration(_))));
    assert!(matches!(ChunkingConfig::new(100, 150), Err(Error::InvalidConfiguration(_))));
    assert_eq!(ChunkingConfig::default(), ChunkingConfig { size: 500, overlap: 50 });
}
