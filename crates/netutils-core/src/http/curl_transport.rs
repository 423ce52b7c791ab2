//! libcurl-backed [`HttpTransport`].
//!
//! One `Easy` handle per exchange, no redirects (a `308` from an upload session
//! is a protocol answer, not a redirect). The request body is pulled from the
//! caller's reader through curl's read callback, so a chunk is never buffered
//! in full.

use super::error::TransportError;
use super::headers;
use super::{HttpTransport, Request, Response};
use crate::config::HttpConfig;
use curl::easy::{Easy, List, ReadError};
use std::cell::{Cell, RefCell};
use std::io::{self, Read};

/// Transport that performs each exchange with a fresh curl handle.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    http: HttpConfig,
}

impl CurlTransport {
    pub fn new(http: HttpConfig) -> Self {
        Self { http }
    }

    fn configure(&self, easy: &mut Easy, request: &Request) -> Result<(), curl::Error> {
        easy.url(&request.url)?;
        easy.custom_request(&request.method)?;
        easy.connect_timeout(self.http.connect_timeout())?;
        if self.http.low_speed_limit > 0 && self.http.low_speed_time_secs > 0 {
            easy.low_speed_limit(self.http.low_speed_limit)?;
            easy.low_speed_time(self.http.low_speed_time())?;
        }
        if self.http.timeout_secs > 0 {
            easy.timeout(self.http.timeout())?;
        }

        let mut list = List::new();
        list.append("Accept: */*")?;
        // Decoded by Response::decoded_body, not by curl.
        list.append("Accept-Encoding: gzip")?;
        // No 100-continue round trip before each chunk.
        list.append("Expect:")?;
        for (k, v) in &request.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)?;
        Ok(())
    }
}

fn sends_body(request: &Request) -> bool {
    !(request.method.eq_ignore_ascii_case("GET") || request.method.eq_ignore_ascii_case("HEAD"))
}

impl HttpTransport for CurlTransport {
    fn send(
        &self,
        request: &Request,
        body: Option<&mut dyn Read>,
    ) -> Result<Response, TransportError> {
        let mut easy = Easy::new();
        self.configure(&mut easy, request)?;

        // Body-less PUT/POST still go out with `Content-Length: 0`.
        let mut empty = io::empty();
        let body: Option<&mut dyn Read> = match body {
            Some(b) => Some(b),
            None if sends_body(request) => Some(&mut empty),
            None => None,
        };
        let has_body = body.is_some();
        if has_body {
            easy.upload(true)?;
            easy.in_filesize(request.content_length)?;
        }
        if request.method.eq_ignore_ascii_case("HEAD") {
            easy.nobody(true)?;
        }

        let header_lines: RefCell<Vec<String>> = RefCell::new(Vec::new());
        let mut response_body: Vec<u8> = Vec::new();
        let sent = Cell::new(0u64);
        let body_failed = Cell::new(false);

        let (sent_in_cb, failed_in_cb) = (&sent, &body_failed);
        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                headers::collect_line(&mut header_lines.borrow_mut(), data);
                true
            })?;
            transfer.write_function(|data| {
                response_body.extend_from_slice(data);
                Ok(data.len())
            })?;
            if let Some(reader) = body {
                transfer.read_function(move |buf| match reader.read(buf) {
                    Ok(n) => {
                        sent_in_cb.set(sent_in_cb.get() + n as u64);
                        Ok(n)
                    }
                    Err(e) => {
                        tracing::debug!("request body read failed: {}", e);
                        failed_in_cb.set(true);
                        Err(ReadError::Abort)
                    }
                })?;
            }
            transfer.perform()
        };

        if let Err(e) = performed {
            if body_failed.get() || e.is_aborted_by_callback() {
                return Err(TransportError::BodyAborted {
                    sent: sent.get(),
                    expected: request.content_length,
                });
            }
            return Err(TransportError::Curl(e));
        }

        let status = easy.response_code()?;
        let lines = header_lines.into_inner();
        Ok(Response {
            status,
            headers: headers::parse_header_lines(&lines),
            body: response_body,
        })
    }
}
