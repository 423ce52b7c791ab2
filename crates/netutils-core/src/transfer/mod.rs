//! Chunked, resumable transfer of a single-pass byte source.
//!
//! A transfer is a sequence of byte-range requests, one in flight at a time.
//! Each chunk's body streams straight from the source through a small
//! [`ReadCarryBuffer`]; nothing is buffered per chunk and the source is never
//! read past the declared total length.

mod body;
mod carry;
mod chunk;
mod engine;
mod error;
mod progress;

pub use carry::ReadCarryBuffer;
pub(crate) use carry::read_retrying;
pub use chunk::{next_chunk, plan_chunks, ChunkDescriptor, Chunks, TransferCursor};
pub use engine::{transfer, upload_single};
pub use error::TransferError;
pub use progress::{ChannelProgress, NoProgress, ProgressEvent, ProgressSink};

use crate::http::MIME_OCTET_STREAM;

pub const DEFAULT_CHUNK_SIZE: u64 = 50 * 1024 * 1024;
pub const DEFAULT_CARRY_BUFFER_BYTES: usize = 8 * 1024;

/// Where and how to send the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub url: String,
    pub method: String,
    pub total_length: u64,
    pub content_type: String,
    /// Bytes the remote already holds; skipped from the source before sending.
    pub start_offset: u64,
    pub chunk_size: u64,
    pub carry_buffer_bytes: usize,
    /// Sent with every chunk (e.g. `Authorization`).
    pub headers: Vec<(String, String)>,
}

impl TransferPlan {
    /// `PUT` of `application/octet-stream` from offset zero in default-sized chunks.
    pub fn new(url: &str, total_length: u64) -> Self {
        Self {
            url: url.to_string(),
            method: "PUT".to_string(),
            total_length,
            content_type: MIME_OCTET_STREAM.to_string(),
            start_offset: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            carry_buffer_bytes: DEFAULT_CARRY_BUFFER_BYTES,
            headers: Vec::new(),
        }
    }

    pub fn method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }

    pub fn content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    pub fn start_offset(mut self, offset: u64) -> Self {
        self.start_offset = offset;
        self
    }

    pub fn chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn carry_buffer_bytes(mut self, bytes: usize) -> Self {
        self.carry_buffer_bytes = bytes;
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Checks the preconditions that must hold before any I/O.
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.total_length == 0 {
            return Err(TransferError::InvalidArgument(
                "total length must be positive".into(),
            ));
        }
        if self.start_offset >= self.total_length {
            return Err(TransferError::InvalidArgument(format!(
                "start offset {} not below total length {}",
                self.start_offset, self.total_length
            )));
        }
        if self.chunk_size == 0 {
            return Err(TransferError::InvalidArgument(
                "chunk size must be positive".into(),
            ));
        }
        if self.carry_buffer_bytes == 0 {
            return Err(TransferError::InvalidArgument(
                "carry buffer must be positive".into(),
            ));
        }
        if self.method.trim().is_empty() {
            return Err(TransferError::InvalidArgument("empty HTTP method".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_defaults() {
        let plan = TransferPlan::new("https://up.example.com/s", 10);
        assert_eq!(plan.method, "PUT");
        assert_eq!(plan.content_type, "application/octet-stream");
        assert_eq!(plan.chunk_size, 50 * 1024 * 1024);
        assert_eq!(plan.start_offset, 0);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn invalid_plans_are_rejected() {
        let base = TransferPlan::new("https://up.example.com/s", 100);
        let bad = [
            TransferPlan::new("https://up.example.com/s", 0),
            base.clone().start_offset(100),
            base.clone().start_offset(250),
            base.clone().chunk_size(0),
            base.clone().carry_buffer_bytes(0),
            base.clone().method(" "),
        ];
        for plan in bad {
            assert!(
                matches!(plan.validate(), Err(TransferError::InvalidArgument(_))),
                "{:?}",
                plan
            );
        }
        assert!(base.start_offset(99).validate().is_ok());
    }
}
