//! Transfer and resume negotiation errors.

use super::chunk::ChunkDescriptor;
use crate::http::TransportError;

/// Error returned by [`transfer`](super::transfer), [`upload_single`](super::upload_single)
/// and the resume strategies.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Rejected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The source ended while skipping to the resume offset.
    #[error("source ended after {consumed} of {expected} bytes to skip")]
    TruncatedSource { expected: u64, consumed: u64 },
    /// The source ended inside a chunk body.
    #[error("source ended {missing} bytes short of chunk {range}")]
    ShortRead { range: ChunkDescriptor, missing: u64 },
    /// The remote answered a chunk with a non-success status.
    #[error("chunk {range} rejected with HTTP {status}")]
    ChunkRejected { status: u32, range: ChunkDescriptor },
    /// The remote answered a single-request upload with a non-success status.
    #[error("upload of {total_length} bytes rejected with HTTP {status}")]
    UploadRejected { status: u32, total_length: u64 },
    /// The remote did not report how much it already holds.
    #[error("resume offset unavailable: {0}")]
    ResumeInfoUnavailable(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Reading the source failed.
    #[error("source read: {0}")]
    Io(#[from] std::io::Error),
}
