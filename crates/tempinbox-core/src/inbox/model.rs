//! Inbox data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempinbox_mime::{DecodedAttachment, HeaderMap, ParsedEmail};

/// SMTP envelope of one incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Envelope sender.
    pub from: String,
    /// Envelope recipient; selects the inbox.
    pub to: String,
}

impl Envelope {
    /// Creates a new envelope.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Selected top-level headers kept alongside the decoded message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredHeaders {
    /// `Message-ID` header.
    pub message_id: Option<String>,
    /// `Date` header, as sent.
    pub date: Option<String>,
    /// `Content-Type` header.
    pub content_type: Option<String>,
}

impl StoredHeaders {
    /// Picks the stored headers out of a header map.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            message_id: headers.get("message-id").map(str::to_string),
            date: headers.get("date").map(str::to_string),
            content_type: headers.get("content-type").map(str::to_string),
        }
    }
}

/// A delivered message as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEmail {
    /// Envelope sender.
    pub from: String,
    /// Normalized recipient.
    pub to: String,
    /// Decoded subject.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// HTML body.
    pub html_body: String,
    /// Captured attachments.
    pub attachments: Vec<DecodedAttachment>,
    /// Arrival time.
    pub timestamp: DateTime<Utc>,
    /// Selected top-level headers.
    pub headers: StoredHeaders,
}

impl StoredEmail {
    /// Assembles the stored form of a decoded message.
    #[must_use]
    pub fn new(
        envelope: &Envelope,
        parsed: ParsedEmail,
        headers: StoredHeaders,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            from: envelope.from.trim().to_string(),
            to: normalize_address(&envelope.to),
            subject: parsed.subject,
            body: parsed.text_body,
            html_body: parsed.html_body,
            attachments: parsed.attachments,
            timestamp,
            headers,
        }
    }

    /// Base storage key of this message.
    ///
    /// The repository suffixes it when another message to the same
    /// recipient already holds it.
    #[must_use]
    pub fn base_key(&self) -> String {
        storage_key(&self.to, self.timestamp)
    }

    /// Listing form under the key it was stored with, without the HTML body.
    #[must_use]
    pub fn summary(&self, key: impl Into<String>) -> StoredEmailSummary {
        StoredEmailSummary {
            key: key.into(),
            from: self.from.clone(),
            to: self.to.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
            has_html: !self.html_body.is_empty(),
            attachments: self.attachments.clone(),
            timestamp: self.timestamp,
            headers: self.headers.clone(),
        }
    }
}

/// Listing form of a stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEmailSummary {
    /// Storage key, for fetching the full message.
    pub key: String,
    /// Envelope sender.
    pub from: String,
    /// Recipient.
    pub to: String,
    /// Decoded subject.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Whether the full message carries an HTML body.
    pub has_html: bool,
    /// Captured attachments.
    pub attachments: Vec<DecodedAttachment>,
    /// Arrival time.
    pub timestamp: DateTime<Utc>,
    /// Selected top-level headers.
    pub headers: StoredHeaders,
}

/// Lower-cases and trims an address so lookups match deliveries.
#[must_use]
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// Builds the storage key `email:{recipient}:{millis}`.
#[must_use]
pub fn storage_key(recipient: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "email:{}:{}",
        normalize_address(recipient),
        timestamp.timestamp_millis()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempinbox_mime::decode;

    fn sample(timestamp: DateTime<Utc>) -> StoredEmail {
        let raw = "Subject: Hello\r\nMessage-ID: <1@example.com>\r\nContent-Type: text/html\r\n\r\n<b>hi</b>";
        StoredEmail::new(
            &Envelope::new(" sender@example.com ", "Box@Example.COM"),
            decode(raw),
            StoredHeaders::from_headers(&HeaderMap::parse(raw)),
            timestamp,
        )
    }

    #[test]
    fn test_storage_key() {
        let timestamp = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(
            storage_key(" Box@Example.com", timestamp),
            "email:box@example.com:1700000000123"
        );
    }

    #[test]
    fn test_stored_email_fields() {
        let timestamp = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let email = sample(timestamp);

        assert_eq!(email.from, "sender@example.com");
        assert_eq!(email.to, "box@example.com");
        assert_eq!(email.subject, "Hello");
        assert_eq!(email.body, "hi");
        assert_eq!(email.html_body, "<b>hi</b>");
        assert_eq!(email.headers.message_id.as_deref(), Some("<1@example.com>"));
        assert_eq!(email.headers.date, None);
        assert_eq!(email.base_key(), "email:box@example.com:1700000000000");
    }

    #[test]
    fn test_json_shape() {
        let timestamp = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let email = sample(timestamp);
        let json = serde_json::to_value(&email).unwrap();

        assert_eq!(json["htmlBody"], "<b>hi</b>");
        assert_eq!(json["headers"]["messageId"], "<1@example.com>");
        assert!(json["headers"]["date"].is_null());
        assert_eq!(json["timestamp"], "2023-11-14T22:13:20Z");

        let summary = serde_json::to_value(email.summary(email.base_key())).unwrap();
        assert!(summary.get("htmlBody").is_none());
        assert_eq!(summary["hasHtml"], true);
        assert_eq!(summary["key"], "email:box@example.com:1700000000000");
    }

    #[test]
    fn test_json_roundtrip() {
        let timestamp = DateTime::from_timestamp_millis(1_700_000_000_456).unwrap();
        let email = sample(timestamp);
        let json = serde_json::to_string(&email).unwrap();
        let back: StoredEmail = serde_json::from_str(&json).unwrap();
        assert_eq!(back, email);
    }
}
