//! Chunk range arithmetic.

use std::fmt;

/// Inclusive byte range `[start, end_inclusive]` sent as one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDescriptor {
    pub start: u64,
    pub end_inclusive: u64,
}

impl ChunkDescriptor {
    /// Number of bytes in the chunk (never zero).
    pub fn len(&self) -> u64 {
        self.end_inclusive - self.start + 1
    }

    /// `Content-Range` request header value: `bytes {start}-{end}/{total}`.
    pub fn content_range(&self, total_length: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end_inclusive, total_length)
    }

    /// Share of `total_length` covered once this chunk is acknowledged, 0..=100.
    pub fn percent_of(&self, total_length: u64) -> u8 {
        if total_length == 0 {
            return 100;
        }
        let pct = (u128::from(self.end_inclusive) + 1) * 100 / u128::from(total_length);
        pct.min(100) as u8
    }
}

impl fmt::Display for ChunkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end_inclusive)
    }
}

/// The chunk starting at `cursor`, or `None` once `cursor` reaches `total_length`.
pub fn next_chunk(cursor: u64, total_length: u64, chunk_size: u64) -> Option<ChunkDescriptor> {
    if cursor >= total_length || chunk_size == 0 {
        return None;
    }
    let end_inclusive = cursor.saturating_add(chunk_size - 1).min(total_length - 1);
    Some(ChunkDescriptor {
        start: cursor,
        end_inclusive,
    })
}

/// Iterator over the chunks covering `[start, total_length)`.
#[derive(Debug, Clone)]
pub struct Chunks {
    cursor: u64,
    total_length: u64,
    chunk_size: u64,
}

impl Iterator for Chunks {
    type Item = ChunkDescriptor;

    fn next(&mut self) -> Option<ChunkDescriptor> {
        let chunk = next_chunk(self.cursor, self.total_length, self.chunk_size)?;
        self.cursor += chunk.len();
        Some(chunk)
    }
}

/// Splits `[start, total_length)` into contiguous chunks of at most `chunk_size`
/// bytes; only the last one may be shorter.
pub fn plan_chunks(start: u64, total_length: u64, chunk_size: u64) -> Chunks {
    Chunks {
        cursor: start,
        total_length,
        chunk_size,
    }
}

/// Bytes acknowledged so far in one transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferCursor {
    sent: u64,
    total_length: u64,
}

impl TransferCursor {
    pub fn new(start_offset: u64, total_length: u64) -> Self {
        Self {
            sent: start_offset.min(total_length),
            total_length,
        }
    }

    pub fn position(&self) -> u64 {
        self.sent
    }

    pub fn is_complete(&self) -> bool {
        self.sent >= self.total_length
    }

    /// Records an acknowledged chunk; chunks must arrive in order.
    pub fn advance(&mut self, chunk: &ChunkDescriptor) {
        debug_assert_eq!(chunk.start, self.sent, "chunk out of order");
        self.sent = (self.sent + chunk.len()).min(self.total_length);
    }
}
