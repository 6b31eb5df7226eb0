//! Multipart body splitting.

use crate::content_type;
use crate::header::HeaderMap;

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimePart<'a> {
    /// Part headers.
    pub headers: HeaderMap,
    /// Part body, still transfer-encoded.
    pub body: &'a str,
}

impl<'a> MimePart<'a> {
    /// Creates a new part.
    #[must_use]
    pub const fn new(headers: HeaderMap, body: &'a str) -> Self {
        Self { headers, body }
    }

    /// Raw `Content-Type` value, empty when absent.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.headers.get("content-type").unwrap_or_default()
    }

    /// Raw `Content-Disposition` value, empty when absent.
    #[must_use]
    pub fn disposition(&self) -> &str {
        self.headers.get("content-disposition").unwrap_or_default()
    }

    /// Raw `Content-Transfer-Encoding` value.
    #[must_use]
    pub fn transfer_encoding(&self) -> Option<&str> {
        self.headers.get("content-transfer-encoding")
    }

    /// The `charset` parameter of the content type.
    #[must_use]
    pub fn charset(&self) -> Option<String> {
        content_type::charset(self.content_type())
    }
}

/// Splits a multipart body into its parts, in order.
///
/// The preamble before the first delimiter is discarded and the closing
/// delimiter ends the body. A segment without a blank line between its
/// headers and body is skipped.
#[must_use]
pub fn split_parts<'a>(content: &'a str, boundary: &str) -> Vec<MimePart<'a>> {
    let delimiter = format!("--{boundary}");
    let mut parts = Vec::new();

    for segment in content.split(delimiter.as_str()).skip(1) {
        let trimmed = segment.trim();
        if trimmed.starts_with("--") {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        // Rest of the delimiter line (transport padding).
        let Some(line_end) = segment.find('\n') else {
            tracing::debug!(boundary, "Skipping part without line break");
            continue;
        };
        let section = &segment[line_end + 1..];

        let Some((header_end, body_start)) = find_blank_line(section) else {
            tracing::debug!(boundary, "Skipping part without header/body separator");
            continue;
        };

        let headers = HeaderMap::parse(&section[..header_end]);
        let body = strip_closing(&section[body_start..]);
        parts.push(MimePart::new(headers, body));
    }

    parts
}

/// Locates the first empty line: `(end of headers, start of body)`.
pub(crate) fn find_blank_line(section: &str) -> Option<(usize, usize)> {
    if section.starts_with("\r\n") {
        return Some((0, 2));
    }
    if section.starts_with('\n') {
        return Some((0, 1));
    }

    let bytes = section.as_bytes();
    for (i, &byte) in bytes.iter().enumerate() {
        if byte != b'\n' {
            continue;
        }
        match (bytes.get(i + 1), bytes.get(i + 2)) {
            (Some(b'\n'), _) => return Some((i, i + 2)),
            (Some(b'\r'), Some(b'\n')) => return Some((i, i + 3)),
            _ => {}
        }
    }

    None
}

fn strip_closing(body: &str) -> &str {
    let body = body.trim_end();
    body.strip_suffix("\n--")
        .map_or(body, |rest| rest.strip_suffix('\r').unwrap_or(rest))
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str = concat!(
        "This is the preamble.\r\n",
        "--frontier\r\n",
        "Content-Type: text/plain; charset=utf-8\r\n",
        "\r\n",
        "First part.\r\n",
        "--frontier\r\n",
        "Content-Type: text/html\r\n",
        "Content-Transfer-Encoding: quoted-printable\r\n",
        "\r\n",
        "<p>Second part.</p>\r\n",
        "--frontier--\r\n",
        "Epilogue.\r\n",
        "\r\n",
        "Looks: like a header\r\n"
    );

    #[test]
    fn test_split_parts() {
        let parts = split_parts(MIXED, "frontier");
        assert_eq!(parts.len(), 2);

        assert_eq!(parts[0].content_type(), "text/plain; charset=utf-8");
        assert_eq!(parts[0].charset().as_deref(), Some("utf-8"));
        assert_eq!(parts[0].body, "First part.");

        assert_eq!(parts[1].content_type(), "text/html");
        assert_eq!(parts[1].transfer_encoding(), Some("quoted-printable"));
        assert_eq!(parts[1].body, "<p>Second part.</p>");
    }

    #[test]
    fn test_split_parts_lf_only() {
        let content = "--b\nContent-Type: text/plain\n\nline one\n\nline two\n--b--\n";
        let parts = split_parts(content, "b");
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].body, "line one\n\nline two");
    }

    #[test]
    fn test_headerless_part() {
        let content = "--b\r\n\r\nimplicit text\r\n--b--";
        let parts = split_parts(content, "b");
        assert_eq!(parts.len(), 1);
        assert!(parts[0].headers.is_empty());
        assert_eq!(parts[0].body, "implicit text");
    }

    #[test]
    fn test_part_without_separator_skipped() {
        let content = "--b\r\nContent-Type: text/plain\r\n--b\r\nContent-Type: text/plain\r\n\r\nok\r\n--b--";
        let parts = split_parts(content, "b");
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].body, "ok");
    }

    #[test]
    fn test_missing_boundary_yields_nothing() {
        assert!(split_parts("no delimiters in here\r\n\r\nat all", "absent").is_empty());
    }

    #[test]
    fn test_folded_part_headers() {
        let content = concat!(
            "--b\r\n",
            "Content-Disposition: attachment;\r\n",
            "\tfilename=\"long.txt\"\r\n",
            "\r\n",
            "data\r\n",
            "--b--"
        );
        let parts = split_parts(content, "b");
        assert_eq!(parts[0].disposition(), "attachment; filename=\"long.txt\"");
    }
}
