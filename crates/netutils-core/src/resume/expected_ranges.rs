//! Upload-session status documents listing the ranges still expected.

use super::{check_offset, ResumeStrategy};
use crate::http::{HttpTransport, Request};
use crate::transfer::TransferError;
use serde::Deserialize;

/// Body of a session status `GET`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatus {
    #[serde(default)]
    pub expiration_date_time: Option<String>,
    #[serde(default)]
    pub next_expected_ranges: Option<Vec<String>>,
}

/// `GET`s the session URL; the first entry of `nextExpectedRanges` starts at
/// the resume offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectedRanges;

impl ResumeStrategy for ExpectedRanges {
    fn resume_offset(
        &self,
        transport: &dyn HttpTransport,
        url: &str,
        total_length: u64,
    ) -> Result<u64, TransferError> {
        let response = transport.send(&Request::new("GET", url), None)?;
        if !response.is_success() {
            return Err(TransferError::ResumeInfoUnavailable(format!(
                "session status answered HTTP {}",
                response.status
            )));
        }
        let body = response.decoded_body()?;
        let status: UploadStatus = serde_json::from_slice(&body).map_err(|e| {
            TransferError::ResumeInfoUnavailable(format!("session status is not JSON: {}", e))
        })?;
        let first = status
            .next_expected_ranges
            .as_deref()
            .and_then(|ranges| ranges.first())
            .ok_or_else(|| {
                TransferError::ResumeInfoUnavailable("no nextExpectedRanges in status".into())
            })?;
        let offset = parse_range_start(first).ok_or_else(|| {
            TransferError::ResumeInfoUnavailable(format!("unparsable expected range '{}'", first))
        })?;
        let offset = check_offset(offset, total_length)?;
        tracing::info!(
            url,
            offset,
            total_length,
            expires = status.expiration_date_time.as_deref().unwrap_or("-"),
            "resume offset from expected ranges"
        );
        Ok(offset)
    }
}

/// Start of `"a-b"`, `"a-"` or `"a"`.
pub fn parse_range_start(range: &str) -> Option<u64> {
    let range = range.trim();
    let start = match range.split_once('-') {
        Some((start, _)) => start,
        None => range,
    };
    start.trim().parse().ok()
}
