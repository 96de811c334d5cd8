//! Cookie string parsing and percent coding.
//!
//! A cookie string is `name=value` pairs separated by `;`. Each segment is
//! trimmed and split on its first `=`; a segment with no `=` is a nameless
//! cookie whose whole text is the value.

/// Percent-encode a cookie name or value.
///
/// Alphanumerics and `-_.~` pass through, everything else is `%XX` encoded.
pub fn encode_component(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Percent-decode a cookie name or value.
///
/// Text that does not decode to UTF-8 is returned as-is.
pub fn decode_component(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Split one segment on its first `=`, trimming both halves.
pub fn split_pair(segment: &str) -> (&str, &str) {
    match segment.split_once('=') {
        Some((name, value)) => (name.trim(), value.trim()),
        None => ("", segment.trim()),
    }
}

/// Raw `(name, value)` pairs in the order they appear, not decoded.
pub fn raw_pairs(cookie_string: &str) -> impl Iterator<Item = (&str, &str)> {
    cookie_string
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(split_pair)
}

/// Decoded `(name, value)` pairs in the order they appear.
pub fn parse_cookie_string(cookie_string: &str) -> Vec<(String, String)> {
    raw_pairs(cookie_string)
        .map(|(name, value)| (decode_component(name), decode_component(value)))
        .collect()
}
