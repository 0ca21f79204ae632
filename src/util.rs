//! Text helpers shared by the segmenter and the renderer.

use std::borrow::Cow;

/// Collapse every whitespace run (NBSP included) to one space and trim.
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Form used for exact marker comparison: normalized, lowercased, trailing
/// colons removed.
pub fn canonical(text: &str) -> String {
    normalize_ws(text)
        .to_lowercase()
        .trim_end_matches(':')
        .to_string()
}

/// Decode bytes to a string.
///
/// 1. UTF-8 (BOM handled by encoding_rs)
/// 2. the hint encoding, when the bytes are not valid UTF-8
/// 3. Windows-1252
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Find the charset named by a `<meta charset=...>` or
/// `<meta http-equiv=... content="...; charset=...">` in the first 1024 bytes.
pub fn extract_meta_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];

    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let mut rest = &prefix[pos + 8..];

    if let Some((&q, tail)) = rest.split_first()
        && (q == b'"' || q == b'\'')
    {
        rest = tail;
    }

    let end = rest
        .iter()
        .position(|&b| matches!(b, b'"' | b'\'' | b';' | b'>' | b' ' | b'/'))
        .unwrap_or(rest.len());

    std::str::from_utf8(&rest[..end])
        .ok()
        .filter(|s| !s.is_empty())
}
