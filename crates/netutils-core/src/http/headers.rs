//! Raw header line collection and lookup.

use std::str;

/// Appends one raw header line as delivered by libcurl's header callback.
///
/// A new status line (`HTTP/...`) starts a fresh block, so after redirects or
/// interim responses only the final response's headers remain.
pub(crate) fn collect_line(lines: &mut Vec<String>, raw: &[u8]) {
    let Ok(text) = str::from_utf8(raw) else {
        return;
    };
    let line = text.trim_end();
    if line.starts_with("HTTP/") {
        lines.clear();
    }
    if !line.is_empty() {
        lines.push(line.to_string());
    }
}

/// Status code from the block's status line, if one was collected.
pub(crate) fn status_code(lines: &[String]) -> Option<u32> {
    let first = lines.first()?;
    let rest = first.strip_prefix("HTTP/")?;
    rest.split_whitespace().nth(1)?.parse().ok()
}

/// Splits `Name: value` lines into pairs; the status line and junk are skipped.
pub(crate) fn parse_header_lines(lines: &[String]) -> Vec<(String, String)> {
    lines
        .iter()
        .filter(|l| !l.starts_with("HTTP/"))
        .filter_map(|l| l.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// First header named `name` (case-insensitive).
pub(crate) fn find<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
