//! Fixed-size word chunker.
//!
//! Splits extracted document text into [`Chunk`]s of at most `chunk_words`
//! words. Splitting happens only on whitespace, so a word is never cut in
//! half. Runs of whitespace (including page breaks) collapse to a single
//! space inside a chunk.

use crate::models::Chunk;

/// Default chunk size in words.
pub const DEFAULT_CHUNK_WORDS: usize = 3000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    #[error("chunk size must be at least one word")]
    ZeroSize,
}

/// Split text into chunks of `chunk_words` words each (the last may be short).
/// Returns chunks with contiguous indices starting at 0; empty or
/// whitespace-only input yields no chunks.
pub fn chunk_text(text: &str, chunk_words: usize) -> Result<Vec<Chunk>, ChunkError> {
    if chunk_words == 0 {
        return Err(ChunkError::ZeroSize);
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let chunks = words
        .chunks(chunk_words)
        .enumerate()
        .map(|(index, slice)| Chunk {
            index,
            word_count: slice.len(),
            text: slice.join(" "),
        })
        .collect();

    Ok(chunks)
}

/// Join every chunk into one context string, newline-separated.
pub fn flatten(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
