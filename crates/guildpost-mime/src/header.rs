//! Message header handling.
//!
//! Composition needs headers emitted in the order they were set
//! (Date, From, To, Subject, MIME-Version, Content-Type), so this is an
//! insertion-ordered list rather than a map.

use std::fmt::Write as _;

/// Insertion-ordered collection of message headers.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header value, replacing an existing one in place or appending.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            slot.1 = value;
        } else {
            self.headers.push((name, value));
        }
    }

    /// Gets the value for a header (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns an iterator over headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Appends all headers as `Name: value` CRLF lines.
    pub fn write_to(&self, out: &mut String) {
        for (name, value) in &self.headers {
            let _ = write!(out, "{name}: {value}\r\n");
        }
    }
}
