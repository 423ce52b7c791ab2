//! HTTP request/response model and the transport seam.
//!
//! The transfer engine and the resume strategies only talk to
//! [`HttpTransport`]; [`CurlTransport`] is the libcurl-backed implementation.
//! Tests substitute scripted transports.

mod curl_transport;
mod decode;
mod error;
pub(crate) mod headers;

pub use curl_transport::CurlTransport;
pub use error::TransportError;

use std::io::Read;

pub const MIME_OCTET_STREAM: &str = "application/octet-stream";
pub const MIME_JSON: &str = "application/json;charset=UTF-8";

/// One outgoing request. `Content-Length` is carried separately from `headers`
/// because the transport needs it to frame a streamed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Exact number of body bytes the transport will pull from the body reader.
    pub content_length: u64,
}

impl Request {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            headers: Vec::new(),
            content_length: 0,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn headers<'a, I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = &'a (String, String)>,
    {
        self.headers.extend(extra.into_iter().cloned());
        self
    }

    pub fn body_length(mut self, len: u64) -> Self {
        self.content_length = len;
        self
    }

    /// First header with this name (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        headers::find(&self.headers, name)
    }
}

/// A completed response. `body` is exactly what came off the wire; use
/// [`Response::decoded_body`] to undo `Content-Encoding: gzip`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub status: u32,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header with this name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        headers::find(&self.headers, name)
    }

    /// Response body with gzip content-encoding removed.
    pub fn decoded_body(&self) -> Result<Vec<u8>, TransportError> {
        decode::decode_body(self.header("content-encoding"), &self.body)
            .map_err(TransportError::Decode)
    }

    /// Decoded body as (lossy) UTF-8 text.
    pub fn text(&self) -> Result<String, TransportError> {
        Ok(String::from_utf8_lossy(&self.decoded_body()?).into_owned())
    }
}

/// Performs one HTTP exchange.
///
/// When `body` is `Some`, the transport reads exactly `request.content_length`
/// bytes from it while the request is in flight. A read error from `body`
/// aborts the exchange so the remote never sees a complete request.
pub trait HttpTransport {
    fn send(&self, request: &Request, body: Option<&mut dyn Read>)
        -> Result<Response, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn send(
        &self,
        request: &Request,
        body: Option<&mut dyn Read>,
    ) -> Result<Response, TransportError> {
        (**self).send(request, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn request_builder_collects_headers() {
        let req = Request::new("PUT", "https://upload.example.com/s/1")
            .header("Content-Range", "bytes 0-9/10")
            .body_length(10);
        assert_eq!(req.method, "PUT");
        assert_eq!(req.content_length, 10);
        assert_eq!(req.header_value("content-range"), Some("bytes 0-9/10"));
        assert_eq!(req.header_value("content-type"), None);
    }

    #[test]
    fn response_success_range() {
        let mut r = Response::default();
        for (status, ok) in [(200, true), (201, true), (299, true), (308, false), (404, false)] {
            r.status = status;
            assert_eq!(r.is_success(), ok, "status {status}");
        }
    }

    #[test]
    fn plain_body_passes_through() {
        let r = Response {
            status: 200,
            headers: vec![("Content-Type".into(), "text/plain".into())],
            body: b"done".to_vec(),
        };
        assert_eq!(r.decoded_body().unwrap(), b"done");
        assert_eq!(r.text().unwrap(), "done");
    }

    #[test]
    fn gzip_body_is_decoded() {
        let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(br#"{"id":"abc"}"#).unwrap();
        let r = Response {
            status: 201,
            headers: vec![("Content-Encoding".into(), "GZIP".into())],
            body: enc.finish().unwrap(),
        };
        assert_eq!(r.text().unwrap(), r#"{"id":"abc"}"#);
    }

    #[test]
    fn corrupt_gzip_is_a_decode_error() {
        let r = Response {
            status: 200,
            headers: vec![("Content-Encoding".into(), "gzip".into())],
            body: b"not gzip at all".to_vec(),
        };
        assert!(matches!(r.decoded_body(), Err(TransportError::Decode(_))));
    }
}
