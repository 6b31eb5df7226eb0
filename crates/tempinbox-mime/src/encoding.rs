//! MIME decoding utilities.
//!
//! Content-Transfer-Encoding (Base64, Quoted-Printable, identity),
//! RFC 2047 encoded words, and charset transcoding. Everything here
//! is best-effort: a body that cannot be decoded is passed through.

use crate::error::{Error, Result};
use base64::Engine;
use base64::alphabet;
use base64::engine::DecodePaddingMode;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use std::fmt;

/// Accepts input with or without padding, as mailers emit both.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit binary.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from a header value.
    ///
    /// Unknown values are treated as 7bit, i.e. identity.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit,
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// Outcome of a best-effort transfer decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<'a> {
    /// The body was transformed into these bytes.
    Decoded(Vec<u8>),
    /// Identity encoding, or decoding failed: the original body.
    PassThrough(&'a str),
}

impl Decoded<'_> {
    /// Returns true if the body was actually transformed.
    #[must_use]
    pub const fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }

    /// Converts the outcome to text using the declared charset.
    #[must_use]
    pub fn into_text(self, charset: Option<&str>) -> String {
        match self {
            Self::Decoded(bytes) => decode_charset(&bytes, charset),
            Self::PassThrough(original) => original.to_string(),
        }
    }

    /// Returns the raw bytes of the outcome.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Decoded(bytes) => bytes,
            Self::PassThrough(original) => original.as_bytes().to_vec(),
        }
    }
}

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes Base64 data, ignoring whitespace and missing padding.
///
/// # Errors
///
/// Returns an error if the input contains characters outside the
/// Base64 alphabet or has an impossible length.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    LENIENT_BASE64
        .decode(strip_whitespace(data))
        .map_err(Into::into)
}

/// Removes every whitespace character.
#[must_use]
pub fn strip_whitespace(data: &str) -> String {
    data.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Decodes Quoted-Printable text (RFC 2045) into raw bytes.
///
/// Soft line breaks are removed first, then every `=XX` escape is
/// replaced by its byte. Escapes that are not two hex digits stay as
/// literal text.
#[must_use]
pub fn decode_quoted_printable(text: &str) -> Vec<u8> {
    let joined = text.replace("=\r\n", "").replace("=\n", "");
    unescape_hex(joined.as_bytes(), b'=')
}

/// Replaces every `<escape>XX` hex escape with its byte.
pub(crate) fn unescape_hex(bytes: &[u8], escape: u8) -> Vec<u8> {
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == escape {
            let hi = bytes.get(i + 1).copied().and_then(hex_value);
            let lo = bytes.get(i + 2).copied().and_then(hex_value);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                result.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        result.push(bytes[i]);
        i += 1;
    }

    result
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Converts decoded bytes to text.
///
/// A charset label known to `encoding_rs` is honoured. Without one the
/// bytes are read as UTF-8, falling back to Windows-1252 so that every
/// byte maps to a character.
#[must_use]
pub fn decode_charset(bytes: &[u8], charset: Option<&str>) -> String {
    if let Some(label) = charset.map(str::trim).filter(|label| !label.is_empty()) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) {
            let (text, _, _) = encoding.decode(bytes);
            return text.into_owned();
        }
        tracing::warn!(charset = label, "Unknown charset, guessing");
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

/// Decodes a body according to its Content-Transfer-Encoding.
///
/// Absent or unknown encodings are identity. A Base64 body that does
/// not decode is passed through unchanged.
#[must_use]
pub fn decode_transfer<'a>(body: &'a str, encoding: Option<&str>) -> Decoded<'a> {
    match encoding.map_or(TransferEncoding::SevenBit, TransferEncoding::parse) {
        TransferEncoding::Base64 => match decode_base64(body) {
            Ok(bytes) => Decoded::Decoded(bytes),
            Err(e) => {
                tracing::debug!(error = %e, "Base64 body did not decode, passing through");
                Decoded::PassThrough(body)
            }
        },
        TransferEncoding::QuotedPrintable => Decoded::Decoded(decode_quoted_printable(body)),
        _ => Decoded::PassThrough(body),
    }
}

/// Decodes a body to text: transfer decoding followed by charset conversion.
#[must_use]
pub fn decode_content(body: &str, encoding: Option<&str>, charset: Option<&str>) -> String {
    decode_transfer(body, encoding).into_text(charset)
}

/// Decodes every RFC 2047 encoded word in a header value.
///
/// Format: `=?charset?encoding?encoded-text?=` with encoding `B` or `Q`.
/// Whitespace between two adjacent encoded words is dropped. A token that
/// does not decode is left exactly as written.
#[must_use]
pub fn decode_words(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut remaining = input;
    let mut last_was_encoded = false;

    while let Some(start) = remaining.find("=?") {
        let before = &remaining[..start];

        match decode_word(&remaining[start..]) {
            Ok((text, consumed)) => {
                if !last_was_encoded || !before.trim().is_empty() {
                    result.push_str(before);
                }
                result.push_str(&text);
                remaining = &remaining[start + consumed..];
                last_was_encoded = true;
            }
            Err(e) => {
                tracing::trace!(error = %e, "Leaving encoded word as-is");
                result.push_str(before);
                result.push_str("=?");
                remaining = &remaining[start + 2..];
                last_was_encoded = false;
            }
        }
    }

    result.push_str(remaining);
    result
}

/// Decodes the single encoded word at the start of `input`.
///
/// Returns the text and the number of bytes the word occupied.
///
/// # Errors
///
/// Returns an error if `input` does not start with a well-formed
/// encoded word or its payload does not decode.
pub fn decode_word(input: &str) -> Result<(String, usize)> {
    let malformed = || Error::InvalidEncodedWord("Invalid RFC 2047 format".to_string());

    let inner = input.strip_prefix("=?").ok_or_else(malformed)?;
    let (charset, rest) = inner.split_once('?').ok_or_else(malformed)?;
    let (encoding, rest) = rest.split_once('?').ok_or_else(malformed)?;
    let end = rest.find('?').ok_or_else(malformed)?;
    if !rest[end..].starts_with("?=") {
        return Err(malformed());
    }
    if charset.is_empty() || charset.contains(char::is_whitespace) {
        return Err(malformed());
    }

    let encoded_text = &rest[..end];
    let consumed = 2 + charset.len() + 1 + encoding.len() + 1 + end + 2;

    let bytes = match encoding.to_uppercase().as_str() {
        "B" => decode_base64(encoded_text)?,
        "Q" => unescape_hex(encoded_text.replace('_', " ").as_bytes(), b'='),
        _ => {
            return Err(Error::InvalidEncodedWord(format!(
                "Unknown encoding: {encoding}"
            )));
        }
    };

    // RFC 2231 allows a language suffix: "utf-8*en".
    let charset = charset.split('*').next().unwrap_or(charset);
    Ok((decode_charset(&bytes, Some(charset)), consumed))
}
