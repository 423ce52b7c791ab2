//! Read-carry buffer between the byte source and request bodies.

use std::io::{self, Read};

/// Fixed-capacity buffer holding bytes already read from the source but not
/// yet handed to a request body.
///
/// Invariant: `offset + len <= capacity`; the bytes in `[offset, offset + len)`
/// are consumed before anything new is read from the source.
#[derive(Debug)]
pub struct ReadCarryBuffer {
    buf: Box<[u8]>,
    offset: usize,
    len: usize,
}

impl ReadCarryBuffer {
    /// A zero capacity is rounded up to one byte.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            offset: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes waiting to be consumed.
    pub fn valid(&self) -> &[u8] {
        &self.buf[self.offset..self.offset + self.len]
    }

    /// Reads once from `source`, taking at most `limit` bytes. Must only be
    /// called when the buffer is empty. Returns 0 at end of stream.
    pub fn refill<R: Read + ?Sized>(&mut self, source: &mut R, limit: u64) -> io::Result<usize> {
        debug_assert!(self.is_empty(), "refill with {} carried bytes", self.len);
        let want = (self.buf.len() as u64).min(limit) as usize;
        self.offset = 0;
        self.len = 0;
        if want == 0 {
            return Ok(0);
        }
        let n = read_retrying(source, &mut self.buf[..want])?;
        self.len = n;
        Ok(n)
    }

    /// Copies as many carried bytes as fit into `out` and consumes them.
    pub fn drain_into(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.len);
        out[..n].copy_from_slice(&self.buf[self.offset..self.offset + n]);
        self.consume(n);
        n
    }

    /// Drops `n` carried bytes from the front.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.len);
        self.offset += n;
        self.len -= n;
        if self.len == 0 {
            self.offset = 0;
        }
    }

    /// Moves leftover bytes to the front so the next chunk starts at offset zero.
    pub fn rewind(&mut self) {
        if self.offset > 0 && self.len > 0 {
            self.buf.copy_within(self.offset..self.offset + self.len, 0);
        }
        self.offset = 0;
    }
}

/// `Read::read`, retried on `Interrupted`.
pub(crate) fn read_retrying<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}
