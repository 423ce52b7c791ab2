//! OneDrive (Microsoft Graph) upload sessions and small-file uploads.

use crate::http::{HttpTransport, Request, MIME_JSON};
use crate::transfer::{upload_single, TransferPlan};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use url::Url;

pub const GRAPH_DRIVE_ROOT: &str = "https://graph.microsoft.com/v1.0/me/drive";

/// Largest file Graph accepts in a single `PUT .../content`.
pub const SIMPLE_UPLOAD_LIMIT: u64 = 4 * 1024 * 1024;

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    item: SessionItem<'a>,
}

#[derive(Debug, Serialize)]
struct SessionItem<'a> {
    #[serde(rename = "@microsoft.graph.conflictBehavior")]
    conflict_behavior: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadSession {
    upload_url: String,
}

/// `{drive_root}/root:{dir}{name}:/{action}` with each segment escaped.
/// `dir` must already be normalized (see [`super::normalize_dir`]).
pub fn item_url(drive_root: &str, dir: &str, name: &str, action: &str) -> Result<String> {
    let mut url = Url::parse(drive_root).with_context(|| format!("bad drive root {}", drive_root))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| anyhow!("{} cannot carry a path", drive_root))?;
        segments.pop_if_empty();
        let item = format!("root:{}{}:", dir, name);
        segments.extend(item.split('/'));
        segments.push(action);
    }
    Ok(url.into())
}

/// Creates an upload session (renaming on conflict) and returns its URL.
pub fn create_upload_session(
    transport: &dyn HttpTransport,
    drive_root: &str,
    token: &str,
    dir: &str,
    name: &str,
) -> Result<String> {
    let url = item_url(drive_root, dir, name, "createUploadSession")?;
    let body = serde_json::to_vec(&SessionRequest {
        item: SessionItem {
            conflict_behavior: "rename",
            name,
        },
    })?;
    let request = Request::new("POST", &url)
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", MIME_JSON)
        .body_length(body.len() as u64);
    let response = transport
        .send(&request, Some(&mut Cursor::new(body)))
        .context("create upload session")?;
    let text = response.text()?;
    if response.status != 200 {
        bail!("createUploadSession returned HTTP {}: {}", response.status, text);
    }
    let session: UploadSession =
        serde_json::from_str(&text).context("parse upload session response")?;
    tracing::info!(name, dir, "onedrive session created");
    Ok(session.upload_url)
}

/// Uploads a small source in one `PUT .../content` request; returns the
/// response body (the created drive item).
pub fn simple_upload<R: Read + ?Sized>(
    transport: &dyn HttpTransport,
    drive_root: &str,
    token: &str,
    dir: &str,
    name: &str,
    source: &mut R,
    total_length: u64,
) -> Result<Vec<u8>> {
    if total_length > SIMPLE_UPLOAD_LIMIT {
        bail!(
            "{} bytes exceed the {} byte single-request limit",
            total_length,
            SIMPLE_UPLOAD_LIMIT
        );
    }
    let url = item_url(drive_root, dir, name, "content")?;
    let plan = TransferPlan::new(&url, total_length).header("Authorization", format!("Bearer {}", token));
    let body = upload_single(transport, &plan, source).context("simple upload")?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Response, TransportError};
    use std::cell::RefCell;

    struct Recorder {
        response: Response,
        seen: RefCell<Vec<(Request, Vec<u8>)>>,
    }

    impl Recorder {
        fn new(status: u32, body: &str) -> Self {
            Self {
                response: Response {
                    status,
                    headers: Vec::new(),
                    body: body.as_bytes().to_vec(),
                },
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl HttpTransport for Recorder {
        fn send(
            &self,
            request: &Request,
            body: Option<&mut dyn Read>,
        ) -> Result<Response, TransportError> {
            let mut sent = vec![0u8; request.content_length as usize];
            if let Some(b) = body {
                b.read_exact(&mut sent).unwrap();
            }
            self.seen.borrow_mut().push((request.clone(), sent));
            Ok(self.response.clone())
        }
    }

    #[test]
    fn item_urls_escape_names() {
        assert_eq!(
            item_url(GRAPH_DRIVE_ROOT, "/", "a.txt", "content").unwrap(),
            "https://graph.microsoft.com/v1.0/me/drive/root:/a.txt:/content"
        );
        assert_eq!(
            item_url(GRAPH_DRIVE_ROOT, "/My Files/", "b c.iso", "createUploadSession").unwrap(),
            "https://graph.microsoft.com/v1.0/me/drive/root:/My%20Files/b%20c.iso:/createUploadSession"
        );
    }

    #[test]
    fn session_body_and_upload_url() {
        let t = Recorder::new(200, r#"{"uploadUrl":"https://sn.up.example.com/up/1","expirationDateTime":"x"}"#);
        let url = create_upload_session(&t, GRAPH_DRIVE_ROOT, "tok", "/", "big.bin").unwrap();
        assert_eq!(url, "https://sn.up.example.com/up/1");

        let seen = t.seen.borrow();
        let (req, body) = &seen[0];
        assert_eq!(req.method, "POST");
        assert_eq!(req.header_value("Authorization"), Some("Bearer tok"));
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json["item"]["@microsoft.graph.conflictBehavior"], "rename");
        assert_eq!(json["item"]["name"], "big.bin");
    }

    #[test]
    fn session_errors_surface_status() {
        let t = Recorder::new(403, r#"{"error":{"code":"accessDenied"}}"#);
        let err = create_upload_session(&t, GRAPH_DRIVE_ROOT, "tok", "/", "x").unwrap_err();
        assert!(format!("{:#}", err).contains("403"));
    }

    #[test]
    fn simple_upload_puts_content() {
        let t = Recorder::new(201, r#"{"id":"01ABC"}"#);
        let body = simple_upload(
            &t,
            GRAPH_DRIVE_ROOT,
            "tok",
            "/Docs/",
            "n.txt",
            &mut Cursor::new(b"hello".to_vec()),
            5,
        )
        .unwrap();
        assert_eq!(body, br#"{"id":"01ABC"}"#);
        let seen = t.seen.borrow();
        assert_eq!(seen[0].0.method, "PUT");
        assert_eq!(
            seen[0].0.url,
            "https://graph.microsoft.com/v1.0/me/drive/root:/Docs/n.txt:/content"
        );
        assert_eq!(seen[0].1, b"hello");
    }

    #[test]
    fn simple_upload_of_empty_file() {
        let t = Recorder::new(201, r#"{"id":"01E","size":0}"#);
        let body = simple_upload(
            &t,
            GRAPH_DRIVE_ROOT,
            "tok",
            "/",
            "empty.txt",
            &mut Cursor::new(Vec::new()),
            0,
        )
        .unwrap();
        assert_eq!(body, br#"{"id":"01E","size":0}"#);
        let seen = t.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.method, "PUT");
        assert_eq!(seen[0].0.content_length, 0);
        assert!(seen[0].1.is_empty());
    }

    #[test]
    fn simple_upload_refuses_large_sources() {
        let t = Recorder::new(201, "");
        let err = simple_upload(
            &t,
            GRAPH_DRIVE_ROOT,
            "tok",
            "/",
            "big",
            &mut Cursor::new(Vec::new()),
            SIMPLE_UPLOAD_LIMIT + 1,
        )
        .unwrap_err();
        assert!(err.to_string().contains("limit"));
        assert!(t.seen.borrow().is_empty());
    }
}
