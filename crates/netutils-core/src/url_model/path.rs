//! Name hint from the URL path.

/// Last non-empty path segment of `url`, percent-decoded.
///
/// Query and fragment never contribute. Returns `None` if the URL does not
/// parse or its path is empty, `.` or `..`.
pub fn last_path_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    let decoded = super::content_disposition::percent_decode(segment);
    Some(decoded)
}
