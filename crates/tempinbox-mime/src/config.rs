//! Decoder configuration: size caps and fallback labels.

/// Maximum characters kept in the plain-text body.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 50_000;
/// Maximum characters kept in the HTML body.
pub const DEFAULT_MAX_HTML_CHARS: usize = 100_000;
/// Maximum decoded size of a single attachment (1 MiB).
pub const DEFAULT_MAX_ATTACHMENT_BYTES: usize = 1024 * 1024;
/// Maximum nesting of multipart containers that is followed.
pub const DEFAULT_MAX_DEPTH: usize = 10;
/// Subject used when the message has none.
pub const DEFAULT_SUBJECT: &str = "(No Subject)";
/// Filename used when an attachment names none.
pub const DEFAULT_FILENAME: &str = "attachment";
/// Appended to the plain-text body when it is cut.
pub const DEFAULT_TRUNCATION_MARKER: &str = "\n\n[Truncated]";

/// Decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Plain-text body cap, in characters.
    pub max_text_chars: usize,
    /// HTML body cap, in characters. Truncation is silent.
    pub max_html_chars: usize,
    /// Attachments whose decoded size exceeds this are dropped.
    pub max_attachment_bytes: usize,
    /// Nested multipart containers deeper than this are ignored.
    pub max_depth: usize,
    /// Subject used when none is present.
    pub default_subject: String,
    /// Filename used when an attachment has none.
    pub default_filename: String,
    /// Marker appended after a truncated plain-text body.
    pub truncation_marker: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            max_html_chars: DEFAULT_MAX_HTML_CHARS,
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
            default_subject: DEFAULT_SUBJECT.to_string(),
            default_filename: DEFAULT_FILENAME.to_string(),
            truncation_marker: DEFAULT_TRUNCATION_MARKER.to_string(),
        }
    }
}

impl DecoderConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> DecoderConfigBuilder {
        DecoderConfigBuilder::new()
    }
}

/// Builder for decoder configuration.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfigBuilder {
    config: DecoderConfig,
}

impl DecoderConfigBuilder {
    /// Creates a new builder seeded with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the plain-text body cap.
    #[must_use]
    pub const fn max_text_chars(mut self, max: usize) -> Self {
        self.config.max_text_chars = max;
        self
    }

    /// Sets the HTML body cap.
    #[must_use]
    pub const fn max_html_chars(mut self, max: usize) -> Self {
        self.config.max_html_chars = max;
        self
    }

    /// Sets the per-attachment size cap.
    #[must_use]
    pub const fn max_attachment_bytes(mut self, max: usize) -> Self {
        self.config.max_attachment_bytes = max;
        self
    }

    /// Sets the nesting limit.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Sets the fallback subject.
    #[must_use]
    pub fn default_subject(mut self, subject: impl Into<String>) -> Self {
        self.config.default_subject = subject.into();
        self
    }

    /// Sets the fallback attachment filename.
    #[must_use]
    pub fn default_filename(mut self, filename: impl Into<String>) -> Self {
        self.config.default_filename = filename.into();
        self
    }

    /// Sets the truncation marker.
    #[must_use]
    pub fn truncation_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.truncation_marker = marker.into();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> DecoderConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::new();
        assert_eq!(config.max_text_chars, 50_000);
        assert_eq!(config.max_html_chars, 100_000);
        assert_eq!(config.max_attachment_bytes, 1_048_576);
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.default_subject, "(No Subject)");
        assert_eq!(config.default_filename, "attachment");
        assert_eq!(config.truncation_marker, "\n\n[Truncated]");
    }

    #[test]
    fn test_builder() {
        let config = DecoderConfig::builder()
            .max_text_chars(10)
            .max_depth(2)
            .default_subject("untitled")
            .build();

        assert_eq!(config.max_text_chars, 10);
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.default_subject, "untitled");
        assert_eq!(config.max_html_chars, DEFAULT_MAX_HTML_CHARS);
    }
}
