//! Request body for one chunk, pulled from the carry buffer and the source.

use super::carry::{read_retrying, ReadCarryBuffer};
use super::error::TransferError;
use std::io::{self, Read};

/// `Read` adapter yielding exactly `remaining` bytes of the source.
///
/// Carried bytes are handed out before the source is read again. When the
/// source ends early or fails, the adapter returns an error so the transport
/// aborts the request, and records what happened for the engine.
pub(crate) struct ChunkBody<'a, R: Read + ?Sized> {
    source: &'a mut R,
    carry: &'a mut ReadCarryBuffer,
    /// Source bytes still unread overall; bounds each refill.
    unread: &'a mut u64,
    remaining: u64,
    exhausted: bool,
    source_error: Option<io::Error>,
}

impl<'a, R: Read + ?Sized> ChunkBody<'a, R> {
    pub(crate) fn new(
        source: &'a mut R,
        carry: &'a mut ReadCarryBuffer,
        unread: &'a mut u64,
        len: u64,
    ) -> Self {
        Self {
            source,
            carry,
            unread,
            remaining: len,
            exhausted: false,
            source_error: None,
        }
    }

    /// Bytes of this chunk not yet handed to the transport.
    pub(crate) fn remaining(&self) -> u64 {
        self.remaining
    }

    /// True once the source hit end-of-stream inside this chunk.
    pub(crate) fn exhausted(&self) -> bool {
        self.exhausted
    }

    pub(crate) fn take_source_error(&mut self) -> Option<io::Error> {
        self.source_error.take()
    }
}

impl<R: Read + ?Sized> Read for ChunkBody<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let want = (buf.len() as u64).min(self.remaining) as usize;
        if self.carry.is_empty() {
            match self.carry.refill(self.source, *self.unread) {
                Ok(0) => {
                    self.exhausted = true;
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "source ended inside chunk",
                    ));
                }
                Ok(n) => *self.unread -= n as u64,
                Err(e) => {
                    let kind = e.kind();
                    self.source_error = Some(e);
                    return Err(io::Error::new(kind, "source read failed"));
                }
            }
        }
        let n = self.carry.drain_into(&mut buf[..want]);
        self.remaining -= n as u64;
        Ok(n)
    }
}

/// Reads and drops exactly `count` bytes from `source`.
pub(crate) fn discard<R: Read + ?Sized>(
    source: &mut R,
    count: u64,
    scratch: &mut [u8],
) -> Result<(), TransferError> {
    let mut consumed = 0u64;
    while consumed < count {
        let want = (scratch.len() as u64).min(count - consumed) as usize;
        let n = read_retrying(source, &mut scratch[..want])?;
        if n == 0 {
            return Err(TransferError::TruncatedSource {
                expected: count,
                consumed,
            });
        }
        consumed += n as u64;
    }
    Ok(())
}
