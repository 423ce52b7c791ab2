//! Remote download used as an upload source.
//!
//! A background thread runs the GET with libcurl and forwards body blocks
//! over a bounded channel, so the download proceeds at the pace the consumer
//! reads. Dropping the source closes the channel, which makes the next write
//! callback fail and curl abort.

use super::ByteSource;
use crate::config::HttpConfig;
use crate::http::headers;
use crate::url_model;
use anyhow::{bail, Context, Result};
use curl::easy::{Easy, List};
use std::cell::{Cell, RefCell};
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

const QUEUED_BLOCKS: usize = 16;

enum Event {
    Head {
        status: u32,
        headers: Vec<(String, String)>,
    },
    Data(Vec<u8>),
    Done(Result<(), String>),
}

pub struct HttpSource {
    name: String,
    total_length: u64,
    rx: Receiver<Event>,
    pending: Vec<u8>,
    pos: usize,
    finished: bool,
}

impl HttpSource {
    /// Starts the download and waits for the response headers. Requires a
    /// 2xx status and a `Content-Length`.
    pub fn open(url: &str, http: &HttpConfig) -> Result<Self> {
        let (tx, rx) = mpsc::sync_channel(QUEUED_BLOCKS);
        let thread_url = url.to_string();
        let thread_http = http.clone();
        thread::Builder::new()
            .name("netutils-download".into())
            .spawn(move || download(&thread_url, &thread_http, tx))
            .context("spawn download thread")?;

        let (status, headers) = match rx.recv() {
            Ok(Event::Head { status, headers }) => (status, headers),
            Ok(Event::Done(Err(e))) => bail!("GET {}: {}", url, e),
            Ok(_) | Err(_) => bail!("GET {}: no response", url),
        };
        if !(200..300).contains(&status) {
            bail!("GET {} returned HTTP {}", url, status);
        }
        let total_length: u64 = headers::find(&headers, "content-length")
            .and_then(|v| v.trim().parse().ok())
            .with_context(|| format!("GET {}: server did not report Content-Length", url))?;
        let name = url_model::source_name(url, headers::find(&headers, "content-disposition"));
        tracing::debug!(url, name = %name, total_length, "remote source opened");

        Ok(Self {
            name,
            total_length,
            rx,
            pending: Vec::new(),
            pos: 0,
            finished: false,
        })
    }
}

impl Read for HttpSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.pos < self.pending.len() {
                let n = buf.len().min(self.pending.len() - self.pos);
                buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if self.finished {
                return Ok(0);
            }
            match self.rx.recv() {
                Ok(Event::Data(block)) => {
                    self.pending = block;
                    self.pos = 0;
                }
                Ok(Event::Head { .. }) => {}
                Ok(Event::Done(Ok(()))) => self.finished = true,
                Ok(Event::Done(Err(e))) => {
                    self.finished = true;
                    return Err(io::Error::new(io::ErrorKind::Other, e));
                }
                Err(_) => {
                    self.finished = true;
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "download thread ended without finishing",
                    ));
                }
            }
        }
    }
}

impl ByteSource for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn total_length(&self) -> u64 {
        self.total_length
    }
}

fn download(url: &str, http: &HttpConfig, tx: SyncSender<Event>) {
    let result = perform(url, http, &tx).map_err(|e| e.to_string());
    let _ = tx.send(Event::Done(result));
}

fn perform(url: &str, http: &HttpConfig, tx: &SyncSender<Event>) -> Result<(), curl::Error> {
    let mut easy = Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.connect_timeout(http.connect_timeout())?;
    // No overall timeout: a large source may take longer than any one chunk.
    if http.low_speed_limit > 0 && http.low_speed_time_secs > 0 {
        easy.low_speed_limit(http.low_speed_limit)?;
        easy.low_speed_time(http.low_speed_time())?;
    }
    let mut list = List::new();
    list.append("Accept: */*")?;
    easy.http_headers(list)?;

    let lines: RefCell<Vec<String>> = RefCell::new(Vec::new());
    let head_sent = Cell::new(false);
    // Headers of the final response, sent once before any body data.
    let send_head = || {
        if !head_sent.replace(true) {
            let lines = lines.borrow();
            let _ = tx.send(Event::Head {
                status: headers::status_code(&lines).unwrap_or(0),
                headers: headers::parse_header_lines(&lines),
            });
        }
    };

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            headers::collect_line(&mut lines.borrow_mut(), data);
            true
        })?;
        transfer.write_function(|data| {
            send_head();
            match tx.send(Event::Data(data.to_vec())) {
                Ok(()) => Ok(data.len()),
                // Reader dropped: short write aborts the transfer.
                Err(_) => Ok(0),
            }
        })?;
        transfer.perform()?;
    }
    send_head();
    Ok(())
}
