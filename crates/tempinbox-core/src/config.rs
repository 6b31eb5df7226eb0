//! Inbox configuration: retention and delivery budget.

use chrono::Duration;
use tempinbox_mime::DecoderConfig;

use crate::{Error, Result};

/// How long a delivered message stays readable (one hour).
pub const DEFAULT_RETENTION_SECS: i64 = 3600;
/// Largest raw message accepted for delivery (25 MiB).
pub const DEFAULT_MAX_RAW_BYTES: usize = 25 * 1024 * 1024;

/// Inbox configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxConfig {
    /// Time from arrival until a message expires.
    pub retention: Duration,
    /// Raw messages larger than this are rejected before decoding.
    pub max_raw_bytes: usize,
    /// Decoder caps and fallback labels.
    pub decoder: DecoderConfig,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            retention: Duration::seconds(DEFAULT_RETENTION_SECS),
            max_raw_bytes: DEFAULT_MAX_RAW_BYTES,
            decoder: DecoderConfig::default(),
        }
    }
}

impl InboxConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> InboxConfigBuilder {
        InboxConfigBuilder::new()
    }
}

/// Builder for inbox configuration.
#[derive(Debug, Clone)]
pub struct InboxConfigBuilder {
    retention_secs: i64,
    max_raw_bytes: usize,
    decoder: DecoderConfig,
}

impl Default for InboxConfigBuilder {
    fn default() -> Self {
        Self {
            retention_secs: DEFAULT_RETENTION_SECS,
            max_raw_bytes: DEFAULT_MAX_RAW_BYTES,
            decoder: DecoderConfig::default(),
        }
    }
}

impl InboxConfigBuilder {
    /// Creates a new builder seeded with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retention period in seconds.
    #[must_use]
    pub const fn retention_secs(mut self, secs: i64) -> Self {
        self.retention_secs = secs;
        self
    }

    /// Sets the raw-size budget.
    #[must_use]
    pub const fn max_raw_bytes(mut self, max: usize) -> Self {
        self.max_raw_bytes = max;
        self
    }

    /// Sets the decoder configuration.
    #[must_use]
    pub fn decoder(mut self, decoder: DecoderConfig) -> Self {
        self.decoder = decoder;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the retention is not positive or out of range,
    /// or if the raw-size budget is zero.
    pub fn build(self) -> Result<InboxConfig> {
        let retention = Duration::try_seconds(self.retention_secs)
            .filter(|retention| *retention > Duration::zero())
            .ok_or_else(|| {
                Error::Config(format!("invalid retention: {} seconds", self.retention_secs))
            })?;

        if self.max_raw_bytes == 0 {
            return Err(Error::Config("max_raw_bytes must be positive".to_string()));
        }

        Ok(InboxConfig {
            retention,
            max_raw_bytes: self.max_raw_bytes,
            decoder: self.decoder,
        })
    }
}
