//! Byte sources: sequential, single-pass, with the total length known up front.

mod file;
mod http;

pub use file::FileSource;
pub use http::HttpSource;

use crate::config::HttpConfig;
use anyhow::{bail, Result};
use std::io::Read;
use std::path::Path;

/// What the transfer engine and the digest consume.
pub trait ByteSource: Read + Send {
    /// Display name (file name, download name or `Untitled`).
    fn name(&self) -> &str;
    /// Bytes the source will yield in total.
    fn total_length(&self) -> u64;
}

/// Opens `uri` as an `http`/`https` download or a local file.
pub fn open(uri: &str, http: &HttpConfig) -> Result<Box<dyn ByteSource>> {
    if let Ok(url) = url::Url::parse(uri) {
        if matches!(url.scheme(), "http" | "https") {
            return Ok(Box::new(HttpSource::open(uri, http)?));
        }
    }
    let path = Path::new(uri);
    if path.exists() {
        return Ok(Box::new(FileSource::open(path)?));
    }
    bail!("source '{}' is neither an http(s) URL nor an existing file", uri)
}
