//! Minimal HTTP/1.1 upload-session server for integration tests.
//!
//! `/session` behaves like a resumable upload session: `PUT` with
//! `Content-Range: bytes a-b/n` appends a chunk (308 + `Range` until the last
//! byte, then 201 with a JSON body), `PUT` with `bytes */n` reports what is
//! stored, and `GET` returns `nextExpectedRanges`. `/file` serves a static
//! download with a `Content-Disposition` name. Every response closes the
//! connection.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const DOWNLOAD_NAME: &str = "payload.bin";

#[derive(Debug, Default)]
struct State {
    stored: Vec<u8>,
    reject_at: Option<u64>,
    content_ranges: Vec<String>,
}

pub struct UploadServer {
    base: String,
    state: Arc<Mutex<State>>,
}

impl UploadServer {
    pub fn session_url(&self) -> String {
        format!("{}session", self.base)
    }

    pub fn file_url(&self) -> String {
        format!("{}file", self.base)
    }

    /// Bytes the session holds so far.
    pub fn stored(&self) -> Vec<u8> {
        self.state.lock().unwrap().stored.clone()
    }

    /// Pretends an earlier attempt already delivered `bytes`.
    pub fn preload(&self, bytes: &[u8]) {
        self.state.lock().unwrap().stored = bytes.to_vec();
    }

    /// The next chunk starting at `offset` is answered with 503 and dropped.
    pub fn reject_chunk_at(&self, offset: u64) {
        self.state.lock().unwrap().reject_at = Some(offset);
    }

    /// `Content-Range` values of all `PUT`s received, in order.
    pub fn content_ranges(&self) -> Vec<String> {
        self.state.lock().unwrap().content_ranges.clone()
    }
}

/// Starts the server on a background thread; `download` is served at `/file`.
pub fn start(download: Vec<u8>) -> UploadServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(State::default()));
    let download = Arc::new(download);
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            let download = Arc::clone(&download);
            thread::spawn(move || handle(stream, &state, &download));
        }
    });
    UploadServer {
        base: format!("http://127.0.0.1:{}/", port),
        state,
    }
}

struct Parsed {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Parsed {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Parsed> {
    let mut data = Vec::new();
    let mut buf = [0u8; 16 * 1024];
    let header_end = loop {
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
    };
    let head = std::str::from_utf8(&data[..header_end]).ok()?;
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let content_length: usize = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(0);
    let mut body = data[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        body.extend_from_slice(&buf[..n]);
    }
    body.truncate(content_length);
    Some(Parsed {
        method,
        path,
        headers,
        body,
    })
}

fn respond(stream: &mut TcpStream, status: &str, headers: &[(&str, String)], body: &[u8]) {
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for (k, v) in headers {
        head.push_str(&format!("{}: {}\r\n", k, v));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

fn handle(mut stream: TcpStream, state: &Mutex<State>, download: &[u8]) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };

    match (req.method.as_str(), req.path.as_str()) {
        ("GET", "/file") => respond(
            &mut stream,
            "200 OK",
            &[
                ("Content-Type", "application/octet-stream".to_string()),
                (
                    "Content-Disposition",
                    format!("attachment; filename=\"{}\"", DOWNLOAD_NAME),
                ),
            ],
            download,
        ),
        ("GET", "/session") => {
            let stored = state.lock().unwrap().stored.len();
            let body = format!(
                r#"{{"expirationDateTime":"2030-01-01T00:00:00Z","nextExpectedRanges":["{}-"]}}"#,
                stored
            );
            respond(
                &mut stream,
                "200 OK",
                &[("Content-Type", "application/json".to_string())],
                body.as_bytes(),
            );
        }
        ("PUT", "/session") => put_session(&mut stream, state, &req),
        _ => respond(&mut stream, "405 Method Not Allowed", &[], b""),
    }
}

fn put_session(stream: &mut TcpStream, state: &Mutex<State>, req: &Parsed) {
    let Some(range) = req.header("content-range").map(str::to_string) else {
        respond(stream, "400 Bad Request", &[], b"missing Content-Range");
        return;
    };
    let mut st = state.lock().unwrap();
    st.content_ranges.push(range.clone());
    let spec = range.trim_start_matches("bytes ").to_string();
    let Some((span, total)) = spec.split_once('/') else {
        drop(st);
        respond(stream, "400 Bad Request", &[], b"bad Content-Range");
        return;
    };
    let total: u64 = total.parse().unwrap_or(0);

    if span == "*" {
        let stored = st.stored.len();
        drop(st);
        let headers = if stored == 0 {
            Vec::new()
        } else {
            vec![("Range", format!("bytes=0-{}", stored - 1))]
        };
        respond(stream, "308 Resume Incomplete", &headers, b"");
        return;
    }

    let Some((a, b)) = span.split_once('-') else {
        drop(st);
        respond(stream, "400 Bad Request", &[], b"bad range");
        return;
    };
    let (start, end): (u64, u64) = (a.parse().unwrap_or(0), b.parse().unwrap_or(0));
    if st.reject_at == Some(start) {
        st.reject_at = None;
        drop(st);
        respond(stream, "503 Service Unavailable", &[], b"busy");
        return;
    }
    if start != st.stored.len() as u64 || req.body.len() as u64 != end - start + 1 {
        drop(st);
        respond(stream, "416 Requested Range Not Satisfiable", &[], b"out of order");
        return;
    }
    st.stored.extend_from_slice(&req.body);
    let stored = st.stored.len() as u64;
    drop(st);

    if stored == total {
        let body = format!(r#"{{"id":"file-1","size":{}}}"#, total);
        respond(
            stream,
            "201 Created",
            &[("Content-Type", "application/json".to_string())],
            body.as_bytes(),
        );
    } else {
        respond(
            stream,
            "308 Resume Incomplete",
            &[("Range", format!("bytes=0-{}", stored - 1))],
            b"",
        );
    }
}
