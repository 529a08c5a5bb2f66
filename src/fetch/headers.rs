// Response header parsing.
// Extracts file size and type from a header-only probe.

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName};

use crate::cache::FileInfo;

/// Build file info from response headers. Header names match case-insensitively.
pub fn file_info_from_headers(headers: &HeaderMap) -> FileInfo {
    let header = |name: HeaderName| headers.get(name).and_then(|v| v.to_str().ok());

    FileInfo {
        file_type: header(CONTENT_TYPE).and_then(parse_file_type),
        size: header(CONTENT_LENGTH).and_then(parse_content_length),
    }
}

/// Leading digits of a `content-length` value.
pub fn parse_content_length(raw: &str) -> Option<u64> {
    let raw = raw.trim_start();
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    raw[..end].parse().ok()
}

/// Upper-cased subtype of a `type/subtype` media type, e.g. `image/png` -> `PNG`.
pub fn parse_file_type(raw: &str) -> Option<String> {
    let (kind, rest) = raw.trim().split_once('/')?;
    if kind.is_empty() || !kind.chars().all(is_word) {
        return None;
    }

    let subtype: String = rest.chars().take_while(|c| is_word(*c)).collect();
    if subtype.is_empty() {
        None
    } else {
        Some(subtype.to_uppercase())
    }
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
