//! Fixed-size character chunking with overlap.
//!
//! Long PDF text is re-split into overlapping windows so downstream prompts
//! stay bounded while keeping context across window boundaries.

/// Combined page text above this many chars triggers chunking.
pub const CHUNK_THRESHOLD_CHARS: usize = 10_000;
/// Window size in chars.
pub const CHUNK_SIZE_CHARS: usize = 4_000;
/// Overlap carried between consecutive windows, in chars.
pub const CHUNK_OVERLAP_CHARS: usize = 200;

/// Split `s` into windows of at most `size` chars, consecutive windows
/// overlapping by `overlap` chars. Windows never split a UTF-8 character.
///
/// Inputs of `size` chars or fewer come back as a single window.
pub fn split_with_overlap(s: &str, size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(overlap < size, "overlap must be smaller than window size");
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= size {
        return vec![s.to_string()];
    }
    let step = size.saturating_sub(overlap).max(1);
    let mut out = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + size).min(chars.len());
        out.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    out
}
