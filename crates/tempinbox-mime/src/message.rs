//! Message decoding: part classification and the top-level decoder.

use crate::config::DecoderConfig;
use crate::content_type::{self, DEFAULT_ATTACHMENT_TYPE};
use crate::encoding::{
    TransferEncoding, decode_base64, decode_transfer, decode_words, encode_base64,
    strip_whitespace,
};
use crate::error::Result;
use crate::header::HeaderMap;
use crate::html::strip_html;
use crate::multipart::{MimePart, find_blank_line, split_parts};

/// An attachment captured from the message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DecodedAttachment {
    /// Filename, RFC 2047 decoded.
    pub filename: String,
    /// `type/subtype` without parameters.
    pub content_type: String,
    /// Decoded size in bytes.
    #[cfg_attr(feature = "serde", serde(rename = "size"))]
    pub size_bytes: usize,
    /// Content as Base64 without line breaks.
    #[cfg_attr(feature = "serde", serde(rename = "data"))]
    pub payload: String,
}

impl DecodedAttachment {
    /// Decodes the payload back to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid Base64.
    pub fn decode_payload(&self) -> Result<Vec<u8>> {
        decode_base64(&self.payload)
    }
}

/// The structured result of decoding one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ParsedEmail {
    /// Decoded subject, or the configured default.
    pub subject: String,
    /// Plain-text body, possibly derived from the HTML body.
    pub text_body: String,
    /// HTML body.
    pub html_body: String,
    /// Attachments in the order they appear.
    pub attachments: Vec<DecodedAttachment>,
}

impl ParsedEmail {
    /// Returns true if an HTML body was found.
    #[must_use]
    pub fn has_html(&self) -> bool {
        !self.html_body.is_empty()
    }

    /// Returns true if any attachment was kept.
    #[must_use]
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// What a part contributes to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// Downloadable attachment.
    Attachment,
    /// HTML body candidate.
    Html,
    /// Plain-text body candidate.
    Text,
    /// Nested multipart container.
    Container,
    /// Contributes nothing.
    Ignored,
}

impl PartKind {
    /// Classifies a part from its `Content-Type` and `Content-Disposition`.
    ///
    /// Disposition is checked first: an `attachment` disposition, or a
    /// `filename` on a non-text part, makes it an attachment whatever
    /// its content type says.
    #[must_use]
    pub fn classify(content_type: &str, disposition: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        let disposition = disposition.to_ascii_lowercase();

        if disposition.contains("attachment")
            || (disposition.contains("filename") && !content_type.contains("text/"))
        {
            Self::Attachment
        } else if content_type.contains("text/html") {
            Self::Html
        } else if content_type.contains("text/plain") {
            Self::Text
        } else if content_type.contains("multipart") {
            Self::Container
        } else {
            Self::Ignored
        }
    }
}

/// Decodes raw messages into [`ParsedEmail`] records.
///
/// Decoding never fails: malformed units are skipped and the result
/// holds whatever could be recovered.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Creates a decoder with the given configuration.
    #[must_use]
    pub const fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes a raw message, reading its top-level headers from the text itself.
    #[must_use]
    pub fn decode_message(&self, raw: &str) -> ParsedEmail {
        let headers = HeaderMap::parse(raw);
        self.decode(raw, &headers)
    }

    /// Decodes a raw message using the given top-level headers.
    ///
    /// `raw` is the complete message text. `headers` supplies at least
    /// `subject`, `content-type` and `content-transfer-encoding`.
    #[must_use]
    pub fn decode(&self, raw: &str, headers: &HeaderMap) -> ParsedEmail {
        let subject = headers
            .get("subject")
            .map(|value| decode_words(value).trim().to_string())
            .filter(|subject| !subject.is_empty())
            .unwrap_or_else(|| self.config.default_subject.clone());

        let mut email = ParsedEmail {
            subject,
            ..ParsedEmail::default()
        };

        let content_type = headers.get("content-type").unwrap_or_default();
        let boundary = if content_type::is_multipart(content_type) {
            let boundary = content_type::extract_boundary(content_type);
            if boundary.is_none() {
                tracing::debug!(content_type, "Multipart message without boundary");
            }
            boundary
        } else {
            None
        };

        match boundary {
            Some(boundary) => self.collect_parts(raw, &boundary, 0, &mut email),
            None => collect_single(raw, headers, &mut email),
        }

        if email.text_body.is_empty() && !email.html_body.is_empty() {
            email.text_body = strip_html(&email.html_body);
        }

        self.apply_caps(&mut email);

        tracing::debug!(
            subject = %email.subject,
            text_len = email.text_body.len(),
            has_html = email.has_html(),
            attachments = email.attachments.len(),
            "Decoded message"
        );

        email
    }

    fn collect_parts(&self, content: &str, boundary: &str, depth: usize, email: &mut ParsedEmail) {
        for part in split_parts(content, boundary) {
            self.collect_part(&part, depth, email);
        }
    }

    fn collect_part(&self, part: &MimePart<'_>, depth: usize, email: &mut ParsedEmail) {
        match PartKind::classify(part.content_type(), part.disposition()) {
            PartKind::Attachment => {
                if let Some(attachment) = self.attachment(part) {
                    email.attachments.push(attachment);
                }
            }
            PartKind::Html => {
                if email.html_body.is_empty() {
                    email.html_body = decode_part_text(part);
                }
            }
            PartKind::Text => {
                if email.text_body.is_empty() {
                    email.text_body = decode_part_text(part);
                }
            }
            PartKind::Container => {
                if depth >= self.config.max_depth {
                    tracing::debug!(depth, "Ignoring multipart nested too deep");
                    return;
                }
                match content_type::extract_boundary(part.content_type()) {
                    Some(boundary) => self.collect_parts(part.body, &boundary, depth + 1, email),
                    None => tracing::debug!("Nested multipart without boundary"),
                }
            }
            PartKind::Ignored => {
                tracing::trace!(content_type = part.content_type(), "Ignoring part");
            }
        }
    }

    fn attachment(&self, part: &MimePart<'_>) -> Option<DecodedAttachment> {
        let filename = content_type::attachment_name(part.disposition(), part.content_type())
            .map(|name| decode_words(name.trim()))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.config.default_filename.clone());

        let content_type = Some(content_type::mime_type(part.content_type()))
            .filter(|mime| !mime.is_empty())
            .unwrap_or_else(|| DEFAULT_ATTACHMENT_TYPE.to_string());

        let encoding = part
            .transfer_encoding()
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse);

        let (payload, size_bytes) = if encoding == TransferEncoding::Base64 {
            let payload = strip_whitespace(part.body);
            // Decoded length is at least this; skip decoding what cannot fit.
            let lower_bound = (payload.len() / 4 * 3).saturating_sub(2);
            if lower_bound > self.config.max_attachment_bytes {
                tracing::debug!(%filename, lower_bound, "Dropping oversized attachment");
                return None;
            }
            match decode_base64(&payload) {
                Ok(bytes) => (payload, bytes.len()),
                Err(e) => {
                    tracing::warn!(%filename, error = %e, "Dropping attachment with corrupt payload");
                    return None;
                }
            }
        } else {
            let bytes = decode_transfer(part.body, part.transfer_encoding()).into_bytes();
            (encode_base64(&bytes), bytes.len())
        };

        if size_bytes > self.config.max_attachment_bytes {
            tracing::debug!(%filename, size_bytes, "Dropping oversized attachment");
            return None;
        }

        Some(DecodedAttachment {
            filename,
            content_type,
            size_bytes,
            payload,
        })
    }

    fn apply_caps(&self, email: &mut ParsedEmail) {
        if let Some(cut) = truncation_point(&email.text_body, self.config.max_text_chars) {
            email.text_body.truncate(cut);
            email.text_body.push_str(&self.config.truncation_marker);
        }
        if let Some(cut) = truncation_point(&email.html_body, self.config.max_html_chars) {
            email.html_body.truncate(cut);
        }
    }
}

/// Decodes a message with the default configuration.
#[must_use]
pub fn decode(raw: &str) -> ParsedEmail {
    Decoder::default().decode_message(raw)
}

/// A non-multipart message: everything after the first blank line is the body.
fn collect_single(raw: &str, headers: &HeaderMap, email: &mut ParsedEmail) {
    let Some((_, body_start)) = find_blank_line(raw) else {
        tracing::debug!("Message has no body");
        return;
    };

    let content_type = headers.get("content-type").unwrap_or_default();
    let text = decode_transfer(
        raw[body_start..].trim(),
        headers.get("content-transfer-encoding"),
    )
    .into_text(content_type::charset(content_type).as_deref());

    if content_type.to_ascii_lowercase().contains("text/html") {
        email.html_body = text;
    } else {
        email.text_body = text;
    }
}

fn decode_part_text(part: &MimePart<'_>) -> String {
    decode_transfer(part.body, part.transfer_encoding()).into_text(part.charset().as_deref())
}

/// Byte offset of the first character past `max_chars`, if there is one.
fn truncation_point(text: &str, max_chars: usize) -> Option<usize> {
    text.char_indices().nth(max_chars).map(|(offset, _)| offset)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(PartKind::classify("text/plain", ""), PartKind::Text);
        assert_eq!(PartKind::classify("TEXT/HTML; charset=utf-8", ""), PartKind::Html);
        assert_eq!(
            PartKind::classify("multipart/alternative; boundary=x", ""),
            PartKind::Container
        );
        assert_eq!(PartKind::classify("image/png", ""), PartKind::Ignored);
        assert_eq!(PartKind::classify("", ""), PartKind::Ignored);
    }

    #[test]
    fn test_classify_disposition_first() {
        assert_eq!(
            PartKind::classify("text/plain", "attachment; filename=notes.txt"),
            PartKind::Attachment
        );
        assert_eq!(
            PartKind::classify("image/png", "inline; filename=logo.png"),
            PartKind::Attachment
        );
        assert_eq!(
            PartKind::classify("text/plain", "inline; filename=notes.txt"),
            PartKind::Text
        );
    }

    #[test]
    fn test_single_part_plain() {
        let raw = "Subject: Hi\r\nContent-Type: text/plain\r\n\r\nHello there\r\n";
        let email = decode(raw);
        assert_eq!(email.subject, "Hi");
        assert_eq!(email.text_body, "Hello there");
        assert!(email.html_body.is_empty());
    }

    #[test]
    fn test_single_part_html_base64() {
        let raw = concat!(
            "Content-Type: text/html; charset=utf-8\r\n",
            "Content-Transfer-Encoding: base64\r\n",
            "\r\n",
            "PHA+SGk8L3A+\r\n"
        );
        let email = decode(raw);
        assert_eq!(email.html_body, "<p>Hi</p>");
        assert_eq!(email.text_body, "Hi");
    }

    #[test]
    fn test_default_subject() {
        assert_eq!(decode("From: a@b\r\n\r\nbody").subject, "(No Subject)");
        assert_eq!(decode("Subject:   \r\n\r\nbody").subject, "(No Subject)");
    }

    #[test]
    fn test_encoded_subject() {
        let email = decode("Subject: =?UTF-8?B?SMOpbGxv?= world\r\n\r\nbody");
        assert_eq!(email.subject, "Héllo world");
    }

    #[test]
    fn test_no_body_separator() {
        let email = decode("Subject: only headers");
        assert_eq!(email.subject, "only headers");
        assert!(email.text_body.is_empty());
    }

    #[test]
    fn test_multipart_without_boundary_is_single_part() {
        let raw = "Content-Type: multipart/mixed\r\n\r\nraw body";
        assert_eq!(decode(raw).text_body, "raw body");
    }

    #[test]
    fn test_truncation_point() {
        assert_eq!(truncation_point("abc", 3), None);
        assert_eq!(truncation_point("abcd", 3), Some(3));
        assert_eq!(truncation_point("ééé", 2), Some(4));
    }

    #[test]
    fn test_custom_caps() {
        let config = DecoderConfig::builder()
            .max_text_chars(5)
            .truncation_marker("…")
            .build();
        let email = Decoder::new(config).decode_message("\r\n\r\n0123456789");
        assert_eq!(email.text_body, "01234…");
    }

    #[test]
    fn test_attachment_payload_roundtrip() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=\"b\"\r\n",
            "\r\n",
            "--b\r\n",
            "Content-Type: application/pdf; name=\"doc.pdf\"\r\n",
            "Content-Disposition: attachment\r\n",
            "Content-Transfer-Encoding: base64\r\n",
            "\r\n",
            "JVBE\r\nRi0x\r\n",
            "--b--\r\n"
        );
        let email = decode(raw);
        let attachment = &email.attachments[0];
        assert_eq!(attachment.filename, "doc.pdf");
        assert_eq!(attachment.content_type, "application/pdf");
        assert_eq!(attachment.payload, "JVBERi0x");
        assert_eq!(attachment.size_bytes, 6);
        assert_eq!(attachment.decode_payload().unwrap(), b"%PDF-1");
    }
}
