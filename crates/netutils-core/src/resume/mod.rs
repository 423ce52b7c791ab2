//! Asking an upload session how many bytes it already holds.
//!
//! The result is the `start_offset` for the next [`transfer`](crate::transfer::transfer).
//! Both strategies fail with [`TransferError::ResumeInfoUnavailable`] when the
//! session does not say; callers then restart from zero.

mod expected_ranges;
mod range_probe;

pub use expected_ranges::{parse_range_start, ExpectedRanges, UploadStatus};
pub use range_probe::{parse_received_range, RangeProbe};

use crate::http::HttpTransport;
use crate::transfer::TransferError;
use std::fmt;
use std::str::FromStr;

/// Computes the resume offset of an upload session.
pub trait ResumeStrategy {
    fn resume_offset(
        &self,
        transport: &dyn HttpTransport,
        url: &str,
        total_length: u64,
    ) -> Result<u64, TransferError>;
}

/// Selectable strategy (CLI flag, provider default).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeMethod {
    /// Empty `PUT` with `Content-Range: bytes */N`, answered by `308` + `Range`.
    RangeProbe,
    /// `GET` of the session, answered by JSON `nextExpectedRanges`.
    ExpectedRanges,
}

impl ResumeMethod {
    pub fn strategy(self) -> Box<dyn ResumeStrategy> {
        match self {
            ResumeMethod::RangeProbe => Box::new(RangeProbe),
            ResumeMethod::ExpectedRanges => Box::new(ExpectedRanges),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResumeMethod::RangeProbe => "range-probe",
            ResumeMethod::ExpectedRanges => "expected-ranges",
        }
    }
}

impl fmt::Display for ResumeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResumeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "range-probe" | "range" => Ok(ResumeMethod::RangeProbe),
            "expected-ranges" | "expected" => Ok(ResumeMethod::ExpectedRanges),
            other => Err(format!(
                "unknown resume method '{}' (expected range-probe or expected-ranges)",
                other
            )),
        }
    }
}

/// Offset reported by a session must lie within the file.
pub(crate) fn check_offset(offset: u64, total_length: u64) -> Result<u64, TransferError> {
    if offset > total_length {
        return Err(TransferError::ResumeInfoUnavailable(format!(
            "remote reports {} bytes of a {} byte upload",
            offset, total_length
        )));
    }
    Ok(offset)
}
