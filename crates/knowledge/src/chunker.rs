//! Fixed-window text chunking with overlap.

use crate::types::Chunk;
use pdfqa_core::{AppResult, ChunkSettings};

/// Split text into overlapping windows of `chunk_size` characters.
///
/// Chunk `i` starts at character offset `i * (chunk_size - overlap_size)` and
/// is clipped to the end of the text, so only the last chunk may be shorter.
/// Chunking stops at the first window that reaches the end of the text; a
/// further window would lie entirely inside it. Windows are taken verbatim:
/// no trimming, no minimum length. Empty text yields no chunks.
///
/// Fails with `AppError::Config` when `overlap_size >= chunk_size` or
/// `chunk_size == 0`, since the window would never advance.
pub fn chunk_text(text: &str, chunk_size: usize, overlap_size: usize) -> AppResult<Vec<Chunk>> {
    let settings = ChunkSettings::new(chunk_size, overlap_size)?;
    Ok(chunk_with(text, &settings))
}

/// Chunk with already-validated settings.
pub fn chunk_with(text: &str, settings: &ChunkSettings) -> Vec<Chunk> {
    // Byte offset of every char boundary, plus the end of the string
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < char_len {
        let end = (start + settings.chunk_size).min(char_len);
        chunks.push(Chunk {
            position: chunks.len(),
            start,
            text: text[boundaries[start]..boundaries[end]].to_string(),
        });
        if end == char_len {
            break;
        }
        start += settings.stride();
    }

    tracing::debug!(
        chars = char_len,
        chunks = chunks.len(),
        chunk_size = settings.chunk_size,
        overlap = settings.overlap_size,
        "Chunked text"
    );

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfqa_core::AppError;

    /// Rebuild the source by dropping each chunk's overlapping prefix.
    fn reconstruct(chunks: &[Chunk], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let skip = if i == 0 { 0 } else { overlap };
            out.extend(chunk.text.chars().skip(skip));
        }
        out
    }

    fn expected_count(len: usize, size: usize, overlap: usize) -> usize {
        if len == 0 {
            0
        } else if len <= overlap {
            1
        } else {
            (len - overlap).div_ceil(size - overlap)
        }
    }

    #[test]
    fn test_default_windows_on_12000_chars() {
        let text: String = (0..12_000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = chunk_text(&text, 10_000, 5_000).unwrap();

        let starts: Vec<usize> = chunks.iter().map(|c| c.start).collect();
        let lens: Vec<usize> = chunks.iter().map(|c| c.char_len()).collect();
        assert_eq!(starts, vec![0, 5_000]);
        assert_eq!(lens, vec![10_000, 7_000]);
        assert_eq!(chunks[1].text, text[5_000..]);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(chunk_text("", 10, 5).unwrap().is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_text("hello", 10_000, 5_000).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello");
        assert_eq!(chunks[0].entry_id(), "id0");
    }

    #[test]
    fn test_chunks_are_not_trimmed() {
        let chunks = chunk_text("  ab  cd  ", 4, 1).unwrap();
        assert_eq!(chunks[0].text, "  ab");
        assert_eq!(chunks[1].text, "b  c");
    }

    #[test]
    fn test_reconstruction_bounds_and_count() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(37);
        let len = text.chars().count();

        for (size, overlap) in [(10, 0), (10, 3), (10, 9), (64, 16), (1, 0), (2_000, 1_999)] {
            let chunks = chunk_text(&text, size, overlap).unwrap();

            assert_eq!(reconstruct(&chunks, overlap), text, "size={} overlap={}", size, overlap);
            assert!(chunks.iter().all(|c| c.char_len() <= size));
            assert_eq!(chunks.len(), expected_count(len, size, overlap));

            for (i, chunk) in chunks.iter().enumerate() {
                assert_eq!(chunk.position, i);
                assert_eq!(chunk.start, i * (size - overlap));
            }
        }
    }

    #[test]
    fn test_overlap_is_shared_between_neighbors() {
        let text: String = ('a'..='z').collect();
        let chunks = chunk_text(&text, 8, 3).unwrap();
        for pair in chunks.windows(2) {
            let tail: String = pair[0].text.chars().skip(pair[0].char_len() - 3).collect();
            let head: String = pair[1].text.chars().take(3).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_offsets_count_characters_not_bytes() {
        let text = "é".repeat(9);
        let chunks = chunk_text(&text, 4, 2).unwrap();
        assert_eq!(chunks[1].start, 2);
        assert_eq!(chunks[1].text, "éééé");
        assert_eq!(reconstruct(&chunks, 2), text);
    }

    #[test]
    fn test_overlap_equal_to_size_fails_fast() {
        let err = chunk_text("abc", 5, 5).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_overlap_larger_than_size_fails_fast() {
        assert!(chunk_text("abc", 5, 6).is_err());
        assert!(chunk_text("abc", 0, 0).is_err());
    }
}
