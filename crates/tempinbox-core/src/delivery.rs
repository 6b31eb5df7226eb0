//! Delivery of raw incoming messages into the inbox.

use chrono::Utc;
use tempinbox_mime::{Decoder, HeaderMap};

use crate::config::InboxConfig;
use crate::inbox::{Envelope, InboxRepository, StoredEmail, StoredHeaders};
use crate::{Error, Result};

/// A stored message and the key it was stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    /// Storage key.
    pub key: String,
    /// The stored message.
    pub email: StoredEmail,
}

/// Decodes incoming messages and persists them.
pub struct DeliveryService {
    decoder: Decoder,
    repository: InboxRepository,
    max_raw_bytes: usize,
}

impl DeliveryService {
    /// Creates a delivery service over an opened repository.
    #[must_use]
    pub fn new(config: &InboxConfig, repository: InboxRepository) -> Self {
        Self {
            decoder: Decoder::new(config.decoder.clone()),
            repository,
            max_raw_bytes: config.max_raw_bytes,
        }
    }

    /// The underlying repository.
    #[must_use]
    pub const fn repository(&self) -> &InboxRepository {
        &self.repository
    }

    /// Decodes and stores one message.
    ///
    /// The raw size is checked before any decoding work is done.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageTooLarge`] if the raw message exceeds the
    /// budget, [`Error::InvalidEnvelope`] if the recipient is blank, or a
    /// storage error if persisting fails.
    pub async fn deliver(&self, envelope: &Envelope, raw: &str) -> Result<Delivered> {
        if envelope.to.trim().is_empty() {
            return Err(Error::InvalidEnvelope("missing recipient".to_string()));
        }
        if raw.len() > self.max_raw_bytes {
            tracing::warn!(
                to = %envelope.to,
                size = raw.len(),
                limit = self.max_raw_bytes,
                "Rejecting oversized message"
            );
            return Err(Error::MessageTooLarge {
                size: raw.len(),
                limit: self.max_raw_bytes,
            });
        }

        let headers = HeaderMap::parse(raw);
        let parsed = self.decoder.decode(raw, &headers);
        let email = StoredEmail::new(
            envelope,
            parsed,
            StoredHeaders::from_headers(&headers),
            Utc::now(),
        );

        let key = self.repository.store(&email).await?;
        tracing::info!(
            key = %key,
            from = %email.from,
            subject = %email.subject,
            attachments = email.attachments.len(),
            has_html = !email.html_body.is_empty(),
            "Delivered email"
        );

        Ok(Delivered { key, email })
    }
}
