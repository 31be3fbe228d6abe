//! # Transport Chunking
//!
//! Splits a command stream into transmission units no larger than the link's
//! maximum write payload.
//!
//! ## Problem
//!
//! A BLE characteristic write carries at most `MTU - 3` bytes (20 bytes on
//! the default 23-byte MTU). A print job is hundreds of bytes, so it has to
//! be cut up, and the pieces must arrive in order: a control code split
//! across two writes is fine, two writes swapped is garbage on paper.
//!
//! ## Law
//!
//! ```text
//! chunk(S, N).map(|c| c.bytes).concat() == S      for every S and N >= 1
//! ```
//!
//! Every chunk except the last is exactly `N` bytes long.

use crate::error::VersoError;

/// A bounded slice of a stream, tagged with its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position of the first byte in the original stream.
    pub offset: usize,
    /// Payload for one write.
    pub bytes: &'a [u8],
}

impl Chunk<'_> {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Offset one past the last byte of this chunk.
    pub fn end(&self) -> usize {
        self.offset + self.bytes.len()
    }
}

/// Lazy, ordered iterator over the chunks of a stream.
///
/// Cloning restarts nothing and copies nothing; it yields the remaining
/// chunks again from the same position.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    data: &'a [u8],
    max_bytes: usize,
    offset: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }
        let end = (self.offset + self.max_bytes).min(self.data.len());
        let chunk = Chunk {
            offset: self.offset,
            bytes: &self.data[self.offset..end],
        };
        self.offset = end;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.data.len() - self.offset).div_ceil(self.max_bytes);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks<'_> {}

impl std::iter::FusedIterator for Chunks<'_> {}

/// Split `data` into chunks of at most `max_bytes`.
///
/// ## Errors
///
/// Returns [`VersoError::InvalidConfiguration`] if `max_bytes` is zero.
///
/// ## Example
///
/// ```
/// use verso::transport::chunk;
///
/// let chunks: Vec<_> = chunk(b"abcdefg", 3).unwrap().collect();
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks[2].offset, 6);
/// assert_eq!(chunks[2].bytes, b"g");
/// ```
pub fn chunk(data: &[u8], max_bytes: usize) -> Result<Chunks<'_>, VersoError> {
    if max_bytes == 0 {
        return Err(VersoError::InvalidConfiguration(
            "chunk size must be at least 1 byte".to_string(),
        ));
    }
    Ok(Chunks {
        data,
        max_bytes,
        offset: 0,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{PrintJob, encode};
    use pretty_assertions::assert_eq;

    fn reassemble(chunks: Chunks<'_>) -> Vec<u8> {
        chunks.flat_map(|c| c.bytes.iter().copied()).collect()
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(matches!(
            chunk(b"abc", 0),
            Err(VersoError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_empty_stream_yields_nothing() {
        assert_eq!(chunk(&[], 20).unwrap().count(), 0);
    }

    #[test]
    fn test_round_trip_across_sizes() {
        let data: Vec<u8> = (0..=255u8).cycle().take(997).collect();
        for max in [1, 2, 7, 20, 64, 996, 997, 998, 4096] {
            assert_eq!(reassemble(chunk(&data, max).unwrap()), data, "max = {}", max);
        }
    }

    #[test]
    fn test_chunk_sizes_bounded() {
        let data = vec![0xAA; 105];
        let chunks: Vec<_> = chunk(&data, 20).unwrap().collect();
        assert_eq!(chunks.len(), 6);
        for c in &chunks[..5] {
            assert_eq!(c.len(), 20);
        }
        assert_eq!(chunks[5].len(), 5);
    }

    #[test]
    fn test_offsets_strictly_increasing_and_contiguous() {
        let data = vec![0u8; 77];
        let chunks: Vec<_> = chunk(&data, 10).unwrap().collect();
        for pair in chunks.windows(2) {
            assert!(pair[0].offset < pair[1].offset);
            assert_eq!(pair[0].end(), pair[1].offset);
        }
        assert_eq!(chunks[0].offset, 0);
        assert_eq!(chunks.last().unwrap().end(), 77);
    }

    #[test]
    fn test_exact_multiple_has_no_short_tail() {
        let data = vec![1u8; 40];
        let chunks: Vec<_> = chunk(&data, 20).unwrap().collect();
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() == 20));
    }

    #[test]
    fn test_size_hint_matches_count() {
        let data = vec![0u8; 41];
        let chunks = chunk(&data, 20).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.count(), 3);
    }

    #[test]
    fn test_restartable_by_clone() {
        let data = b"0123456789";
        let chunks = chunk(data, 4).unwrap();
        let first: Vec<_> = chunks.clone().collect();
        let second: Vec<_> = chunks.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_self_test_job_chunks_to_ceil() {
        let stream = encode(&PrintJob::self_test());
        let chunks = chunk(stream.as_bytes(), 20).unwrap();
        assert_eq!(chunks.len(), stream.len().div_ceil(20));
        assert_eq!(reassemble(chunks), stream.into_bytes());
    }
}
