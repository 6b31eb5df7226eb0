//! # tempinbox-mime
//!
//! Best-effort MIME decoding of raw inbound email.
//!
//! ## Features
//!
//! - **Header unfolding**: RFC 2822 folded headers into a case-insensitive map
//! - **Multipart**: boundary splitting with nested containers, depth-limited
//! - **Encoding/Decoding**: Base64, Quoted-Printable, RFC 2047 encoded words,
//!   charset transcoding
//! - **Attachments**: size-capped capture as Base64 payloads
//! - **HTML fallback**: plain text derived from HTML when no text part exists
//!
//! Decoding never fails. Malformed input yields whatever could be
//! recovered, down to an empty [`ParsedEmail`] with the default subject.
//!
//! ## Quick Start
//!
//! ```
//! use tempinbox_mime::decode;
//!
//! let raw = "Subject: Test\r\n\
//!            Content-Type: text/html\r\n\
//!            \r\n\
//!            <p>Hello, <b>World</b>!</p>";
//!
//! let email = decode(raw);
//! assert_eq!(email.subject, "Test");
//! assert_eq!(email.html_body, "<p>Hello, <b>World</b>!</p>");
//! assert_eq!(email.text_body, "Hello, World !");
//! ```
//!
//! ### Custom limits
//!
//! ```
//! use tempinbox_mime::{Decoder, DecoderConfig};
//!
//! let config = DecoderConfig::builder()
//!     .max_attachment_bytes(256 * 1024)
//!     .default_subject("(untitled)")
//!     .build();
//!
//! let email = Decoder::new(config).decode_message("\r\nbody");
//! assert_eq!(email.subject, "(untitled)");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod header;
mod message;

pub mod content_type;
pub mod encoding;
pub mod html;
pub mod multipart;

pub use config::{
    DEFAULT_FILENAME, DEFAULT_MAX_ATTACHMENT_BYTES, DEFAULT_MAX_DEPTH, DEFAULT_MAX_HTML_CHARS,
    DEFAULT_MAX_TEXT_CHARS, DEFAULT_SUBJECT, DEFAULT_TRUNCATION_MARKER, DecoderConfig,
    DecoderConfigBuilder,
};
pub use encoding::{Decoded, TransferEncoding};
pub use error::{Error, Result};
pub use header::HeaderMap;
pub use message::{DecodedAttachment, Decoder, ParsedEmail, PartKind, decode};
pub use multipart::MimePart;
