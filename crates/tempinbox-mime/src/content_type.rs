//! Tolerant access to `Content-Type` and `Content-Disposition` values.
//!
//! Header parameters are located by scanning rather than by a strict
//! grammar, so values that a real parser would reject still yield
//! whatever can be recovered.

use crate::encoding::{decode_charset, unescape_hex};

/// Content type used for attachments that declare none.
pub const DEFAULT_ATTACHMENT_TYPE: &str = "application/octet-stream";

/// Returns the lower-cased `type/subtype` with parameters stripped.
#[must_use]
pub fn mime_type(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Returns true if the value names a `multipart/*` type.
#[must_use]
pub fn is_multipart(value: &str) -> bool {
    value.to_ascii_lowercase().contains("multipart")
}

/// Returns the `charset` parameter if present.
#[must_use]
pub fn charset(value: &str) -> Option<String> {
    parameter(value, "charset")
}

/// Extracts the multipart boundary from a `Content-Type` value.
///
/// A quoted boundary is taken whole; an unquoted one ends at the first
/// `;` or whitespace.
#[must_use]
pub fn extract_boundary(value: &str) -> Option<String> {
    let (raw, quoted) = raw_parameter(value, "boundary")?;
    if quoted {
        return Some(raw);
    }
    raw.split_whitespace().next().map(str::to_string)
}

/// Returns the value of a header parameter such as `name=` or `filename=`.
///
/// The name is matched case-insensitively and only at a parameter
/// boundary, so `name` does not match inside `filename`. Quoted values
/// run to the closing quote; bare values run to the next `;`.
#[must_use]
pub fn parameter(value: &str, name: &str) -> Option<String> {
    raw_parameter(value, name).map(|(raw, _)| raw)
}

/// Returns an RFC 2231 extended parameter (`name*=charset'lang'%XX...`), decoded.
#[must_use]
pub fn extended_parameter(value: &str, name: &str) -> Option<String> {
    let (raw, _) = raw_parameter(value, &format!("{name}*"))?;

    let mut fields = raw.splitn(3, '\'');
    let (charset, encoded) = match (fields.next(), fields.next(), fields.next()) {
        (Some(charset), Some(_language), Some(encoded)) => (Some(charset), encoded),
        _ => (None, raw.as_str()),
    };

    let bytes = unescape_hex(encoded.as_bytes(), b'%');
    let text = decode_charset(&bytes, charset);
    (!text.is_empty()).then_some(text)
}

/// Finds the attachment filename: `Content-Disposition` first, then the
/// `Content-Type` `name` parameter. Extended (RFC 2231) forms win over
/// plain ones within each header.
#[must_use]
pub fn attachment_name(disposition: &str, content_type: &str) -> Option<String> {
    extended_parameter(disposition, "filename")
        .or_else(|| parameter(disposition, "filename"))
        .or_else(|| extended_parameter(content_type, "name"))
        .or_else(|| parameter(content_type, "name"))
}

fn raw_parameter(value: &str, name: &str) -> Option<(String, bool)> {
    let start = find_parameter(value, name)?;
    let rest = value[start..].trim_start();

    let (text, quoted) = match rest.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let inner = &rest[1..];
            let end = inner.find(quote).unwrap_or(inner.len());
            (&inner[..end], true)
        }
        _ => {
            let end = rest.find([';', '\r', '\n']).unwrap_or(rest.len());
            (rest[..end].trim(), false)
        }
    };

    (!text.is_empty()).then(|| (text.to_string(), quoted))
}

/// Byte offset just past `name=` (whitespace around `=` allowed).
fn find_parameter(value: &str, name: &str) -> Option<usize> {
    // ASCII lower-casing keeps byte offsets aligned with `value`.
    let lower = value.to_ascii_lowercase();
    let name = name.to_ascii_lowercase();
    let mut from = 0;

    while let Some(pos) = lower[from..].find(&name) {
        let start = from + pos;
        let end = start + name.len();

        let at_boundary = lower[..start]
            .chars()
            .next_back()
            .is_none_or(|c| c == ';' || c.is_whitespace());
        let after = &lower[end..];
        let trimmed = after.trim_start();

        if at_boundary && trimmed.starts_with('=') {
            return Some(end + (after.len() - trimmed.len()) + 1);
        }
        from = end;
    }

    None
}
