//! Display names for byte sources.
//!
//! A remote source is named from its `Content-Disposition` header when the
//! server sends one, otherwise from the last segment of the URL path.

mod content_disposition;
mod path;

pub use content_disposition::disposition_filename;
pub use path::last_path_segment;

/// Name used when neither the header nor the URL yields anything.
pub const UNTITLED: &str = "Untitled";

/// Picks the display name for a source downloaded from `url`.
///
/// - `source_name("https://example.com/a/video.mp4?sig=1", None)` → `"video.mp4"`
/// - `source_name("https://example.com/dl", Some("attachment; filename=\"x.zip\""))` → `"x.zip"`
pub fn source_name(url: &str, content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(disposition_filename)
        .or_else(|| last_path_segment(url))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}
