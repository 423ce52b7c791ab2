//! Content-Encoding handling for response bodies.

use flate2::read::GzDecoder;
use std::io::{self, Read};

/// Undo `Content-Encoding: gzip`; other encodings are returned as-is.
pub(super) fn decode_body(content_encoding: Option<&str>, body: &[u8]) -> io::Result<Vec<u8>> {
    let gzip = content_encoding
        .map(|v| v.split(',').any(|e| e.trim().eq_ignore_ascii_case("gzip")))
        .unwrap_or(false);
    // Some servers label empty 308/204 bodies as gzip.
    if !gzip || body.is_empty() {
        return Ok(body.to_vec());
    }
    let mut out = Vec::with_capacity(body.len() * 4);
    GzDecoder::new(body).read_to_end(&mut out)?;
    Ok(out)
}
