//! Google resumable upload sessions (Drive files and YouTube videos).

use crate::http::{HttpTransport, Request, MIME_JSON, MIME_OCTET_STREAM};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

pub const UPLOAD_ENDPOINT: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=resumable";
pub const YOUTUBE_UPLOAD_ENDPOINT: &str = "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status,contentDetails";

/// Drive file metadata sent when opening a session.
#[derive(Debug, Serialize)]
pub struct DriveFile<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Private,
    Unlisted,
}

impl Privacy {
    /// Unknown or missing values fall back to `public`.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Private => "private",
            Privacy::Unlisted => "unlisted",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Privacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Privacy::Public),
            "private" => Ok(Privacy::Private),
            "unlisted" => Ok(Privacy::Unlisted),
            other => Err(format!(
                "unknown privacy '{}' (expected public, private or unlisted)",
                other
            )),
        }
    }
}

/// YouTube video resource; only the fields set at upload time.
#[derive(Debug, Serialize)]
pub struct Video<'a> {
    pub snippet: VideoSnippet<'a>,
    pub status: VideoStatus,
}

#[derive(Debug, Serialize)]
pub struct VideoSnippet<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
    pub privacy_status: Privacy,
}

impl<'a> Video<'a> {
    pub fn new(title: Option<&'a str>, privacy: Privacy) -> Self {
        Self {
            snippet: VideoSnippet { title },
            status: VideoStatus {
                privacy_status: privacy,
            },
        }
    }
}

/// Starts a resumable session described by `metadata` and returns the
/// session URL from the `Location` header.
pub fn open_session<M: Serialize + ?Sized>(
    transport: &dyn HttpTransport,
    endpoint: &str,
    token: &str,
    metadata: &M,
    total_length: u64,
) -> Result<String> {
    let body = serde_json::to_vec(metadata)?;
    let request = Request::new("POST", endpoint)
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", MIME_JSON)
        .header("X-Upload-Content-Length", total_length.to_string())
        .header("X-Upload-Content-Type", MIME_OCTET_STREAM)
        .body_length(body.len() as u64);
    let response = transport
        .send(&request, Some(&mut Cursor::new(body)))
        .context("open upload session")?;
    if response.status != 200 {
        bail!(
            "upload session request returned HTTP {}: {}",
            response.status,
            response.text().unwrap_or_default()
        );
    }
    let location = response
        .header("location")
        .context("upload session response has no Location header")?;
    tracing::info!(endpoint, total_length, "google upload session opened");
    Ok(location.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Response, TransportError};
    use std::cell::RefCell;
    use std::io::Read;

    struct Recorder {
        status: u32,
        location: Option<&'static str>,
        seen: RefCell<Option<(Request, Vec<u8>)>>,
    }

    impl HttpTransport for Recorder {
        fn send(
            &self,
            request: &Request,
            body: Option<&mut dyn Read>,
        ) -> Result<Response, TransportError> {
            let mut sent = Vec::new();
            if let Some(b) = body {
                b.read_to_end(&mut sent).unwrap();
            }
            *self.seen.borrow_mut() = Some((request.clone(), sent));
            let mut headers = Vec::new();
            if let Some(l) = self.location {
                headers.push(("Location".to_string(), l.to_string()));
            }
            Ok(Response {
                status: self.status,
                headers,
                body: Vec::new(),
            })
        }
    }

    #[test]
    fn session_request_and_location() {
        let t = Recorder {
            status: 200,
            location: Some("https://www.googleapis.com/upload/drive/v3/files?upload_id=xyz"),
            seen: RefCell::new(None),
        };
        let url = open_session(&t, UPLOAD_ENDPOINT, "tok", &DriveFile { name: "a b.iso" }, 5_000_000).unwrap();
        assert_eq!(url, "https://www.googleapis.com/upload/drive/v3/files?upload_id=xyz");

        let (req, body) = t.seen.borrow_mut().take().unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.header_value("authorization"), Some("Bearer tok"));
        assert_eq!(req.header_value("x-upload-content-length"), Some("5000000"));
        assert_eq!(
            req.header_value("x-upload-content-type"),
            Some("application/octet-stream")
        );
        assert_eq!(body, br#"{"name":"a b.iso"}"#);
        assert_eq!(req.content_length, body.len() as u64);
    }

    #[test]
    fn non_200_or_missing_location_fails() {
        let t = Recorder {
            status: 401,
            location: None,
            seen: RefCell::new(None),
        };
        assert!(open_session(&t, UPLOAD_ENDPOINT, "tok", &DriveFile { name: "x" }, 1).is_err());
        let t = Recorder {
            status: 200,
            location: None,
            seen: RefCell::new(None),
        };
        let err = open_session(&t, UPLOAD_ENDPOINT, "tok", &DriveFile { name: "x" }, 1).unwrap_err();
        assert!(err.to_string().contains("Location"));
    }

    #[test]
    fn youtube_session_sends_video_resource() {
        let t = Recorder {
            status: 200,
            location: Some("https://www.googleapis.com/upload/youtube/v3/videos?upload_id=v1"),
            seen: RefCell::new(None),
        };
        let video = Video::new(Some("Talk"), Privacy::Unlisted);
        let url = open_session(&t, YOUTUBE_UPLOAD_ENDPOINT, "tok", &video, 42).unwrap();
        assert!(url.ends_with("upload_id=v1"));

        let (req, body) = t.seen.borrow_mut().take().unwrap();
        assert_eq!(req.url, YOUTUBE_UPLOAD_ENDPOINT);
        assert_eq!(req.header_value("x-upload-content-length"), Some("42"));
        assert_eq!(
            body,
            br#"{"snippet":{"title":"Talk"},"status":{"privacyStatus":"unlisted"}}"#
        );
    }

    #[test]
    fn untitled_video_omits_title() {
        let json = serde_json::to_string(&Video::new(None, Privacy::default())).unwrap();
        assert_eq!(json, r#"{"snippet":{},"status":{"privacyStatus":"public"}}"#);
    }

    #[test]
    fn privacy_falls_back_to_public() {
        assert_eq!(Privacy::parse_lenient(Some("PRIVATE")), Privacy::Private);
        assert_eq!(Privacy::parse_lenient(Some("Unlisted")), Privacy::Unlisted);
        assert_eq!(Privacy::parse_lenient(Some("friends")), Privacy::Public);
        assert_eq!(Privacy::parse_lenient(None), Privacy::Public);
    }
}
