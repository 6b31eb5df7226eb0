//! Header unfolding and case-insensitive header access.

use std::collections::HashMap;
use std::fmt;

/// Ordered collection of unfolded headers.
///
/// Names are stored lower-cased and values trimmed. Every occurrence is
/// kept in arrival order; [`HeaderMap::get`] answers with the last one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
    last: HashMap<String, usize>,
}

impl HeaderMap {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().trim().to_lowercase();
        let value = value.into().trim().to_string();
        self.last.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
    }

    /// Gets the last value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.last
            .get(&name.to_lowercase())
            .map(|&index| self.entries[index].1.as_str())
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get_first(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Gets all values for a header.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        let name = name.to_lowercase();
        self.entries
            .iter()
            .filter(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.last.contains_key(&name.to_lowercase())
    }

    /// Returns an iterator over all headers in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of header lines held, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no header was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unfolds a header block.
    ///
    /// Continuation lines (leading space or tab) are joined to the header
    /// being accumulated with a single space. Parsing stops at the first
    /// empty line, so a whole message may be passed in. Lines that are
    /// neither a continuation nor `name: value` are dropped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = current.as_mut() {
                    let folded = line.trim();
                    if !folded.is_empty() {
                        value.push(' ');
                        value.push_str(folded);
                    }
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, value);
            }

            match line.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => {
                    current = Some((name.to_string(), value.to_string()));
                }
                _ => tracing::trace!(line, "Dropping malformed header line"),
            }
        }

        if let Some((name, value)) = current {
            headers.add(name, value);
        }

        headers
    }
}

impl fmt::Display for HeaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            // "content-type" -> "Content-Type"
            let capitalized = name
                .split('-')
                .map(|part| {
                    let mut chars = part.chars();
                    chars.next().map_or_else(String::new, |first| {
                        first.to_uppercase().collect::<String>() + chars.as_str()
                    })
                })
                .collect::<Vec<_>>()
                .join("-");

            writeln!(f, "{capitalized}: {value}")?;
        }

        Ok(())
    }
}
