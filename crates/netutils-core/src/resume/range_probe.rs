//! `308 Resume Incomplete` probing.

use super::{check_offset, ResumeStrategy};
use crate::http::{HttpTransport, Request};
use crate::transfer::TransferError;

const RESUME_INCOMPLETE: u32 = 308;

/// Sends an empty `PUT` with `Content-Range: bytes */{total}`; the session
/// answers `308` with `Range: bytes=0-N`, so `N + 1` bytes are stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeProbe;

impl ResumeStrategy for RangeProbe {
    fn resume_offset(
        &self,
        transport: &dyn HttpTransport,
        url: &str,
        total_length: u64,
    ) -> Result<u64, TransferError> {
        let request = Request::new("PUT", url)
            .header("Content-Range", format!("bytes */{}", total_length))
            .body_length(0);
        let response = transport.send(&request, None)?;
        if response.status != RESUME_INCOMPLETE {
            return Err(TransferError::ResumeInfoUnavailable(format!(
                "status probe answered HTTP {}",
                response.status
            )));
        }
        let range = response.header("range").ok_or_else(|| {
            TransferError::ResumeInfoUnavailable("308 without Range header".into())
        })?;
        let offset = parse_received_range(range).ok_or_else(|| {
            TransferError::ResumeInfoUnavailable(format!("unparsable Range '{}'", range))
        })?;
        let offset = check_offset(offset, total_length)?;
        tracing::info!(url, offset, total_length, "resume offset from range probe");
        Ok(offset)
    }
}

/// `bytes=0-N` -> `N + 1`. Sessions only ever report a prefix starting at 0.
pub fn parse_received_range(value: &str) -> Option<u64> {
    let spec = value.trim().strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;
    if start.trim() != "0" {
        return None;
    }
    end.trim().parse::<u64>().ok()?.checked_add(1)
}
