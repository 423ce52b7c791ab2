//! `Content-Disposition` filename extraction.

/// Filename carried by a `Content-Disposition` header value.
///
/// `filename*=charset''pct-encoded` (RFC 5987) beats a plain `filename=`; the
/// plain form may be quoted (with `\"` escapes) or a bare token. Returns `None`
/// when neither parameter yields a non-empty name.
pub fn disposition_filename(header_value: &str) -> Option<String> {
    let mut plain: Option<String> = None;

    for param in header_value.split(';') {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let raw = raw.trim();

        match key.as_str() {
            "filename*" => {
                if let Some(name) = extended_value(raw).filter(|s| !s.is_empty()) {
                    return Some(name);
                }
            }
            "filename" => {
                let name = unquote(raw);
                if !name.is_empty() {
                    plain = Some(name);
                }
            }
            _ => {}
        }
    }

    plain
}

/// Decodes `charset'lang'value`; only the charset-agnostic percent decoding is applied.
fn extended_value(raw: &str) -> Option<String> {
    let raw = unquote(raw);
    let mut parts = raw.splitn(3, '\'');
    let _charset = parts.next()?;
    let _language = parts.next()?;
    let value = parts.next()?;
    Some(percent_decode(value))
}

/// Strips surrounding quotes and resolves backslash escapes inside them.
fn unquote(raw: &str) -> String {
    let inner = match raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner,
        None => return raw.to_string(),
    };
    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    if escaped {
        out.push('\\');
    }
    out
}

/// Lossy percent-decoding; malformed escapes are kept verbatim.
pub(super) fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_filename() {
        assert_eq!(
            disposition_filename("attachment; filename=\"season 1.zip\"").as_deref(),
            Some("season 1.zip")
        );
    }

    #[test]
    fn token_filename() {
        assert_eq!(
            disposition_filename("attachment; filename=notes.txt").as_deref(),
            Some("notes.txt")
        );
    }

    #[test]
    fn escaped_quotes_inside_value() {
        assert_eq!(
            disposition_filename(r#"attachment; filename="say \"hi\".txt""#).as_deref(),
            Some("say \"hi\".txt")
        );
    }

    #[test]
    fn extended_value_decoded() {
        assert_eq!(
            disposition_filename("attachment; filename*=UTF-8''na%C3%AFve.txt").as_deref(),
            Some("naïve.txt")
        );
    }

    #[test]
    fn extended_value_takes_precedence() {
        assert_eq!(
            disposition_filename(
                "attachment; filename=\"fallback.bin\"; filename*=utf-8'en'real%20name.dat"
            )
            .as_deref(),
            Some("real name.dat")
        );
    }

    #[test]
    fn no_filename_parameter() {
        assert_eq!(disposition_filename("inline"), None);
        assert_eq!(disposition_filename("attachment; filename=\"\""), None);
    }

    #[test]
    fn malformed_percent_escape_kept() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("a%zzb"), "a%zzb");
        assert_eq!(percent_decode("%41%42"), "AB");
    }
}
