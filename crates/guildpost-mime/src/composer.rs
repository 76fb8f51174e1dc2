//! Outbound message composition.
//!
//! Builds the RFC 5322 message handed to the DATA stage: headers, an inline
//! HTML body, and optionally a calendar attachment under a multipart/mixed
//! boundary. Payload line endings are left as supplied; the transport
//! normalizes and dot-stuffs the assembled message immediately before
//! transmission.

use chrono::{DateTime, Utc};

use crate::boundary::boundary;
use crate::encoding::encode_word;
use crate::error::{Error, Result};
use crate::header::Headers;

/// Calendar attachment payload, supplied ready-made by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarInvite {
    /// Attachment filename (e.g. `invite.ics`).
    pub filename: String,
    /// MIME type for the attachment part.
    pub mime_type: String,
    /// The calendar payload, treated as opaque text.
    pub content: String,
}

impl CalendarInvite {
    /// Creates a calendar invite with the standard REQUEST content type.
    #[must_use]
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: "text/calendar; method=REQUEST".to_string(),
            content: content.into(),
        }
    }

    /// Overrides the attachment MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

/// Specification of one outbound message.
#[derive(Debug, Clone)]
pub struct MessageSpec {
    from_name: Option<String>,
    from_address: String,
    to_name: Option<String>,
    to_address: String,
    subject: String,
    html: String,
    invite: Option<CalendarInvite>,
}

impl MessageSpec {
    /// Creates a message spec with the required fields.
    #[must_use]
    pub fn new(
        from_address: impl Into<String>,
        to_address: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            from_name: None,
            from_address: from_address.into(),
            to_name: None,
            to_address: to_address.into(),
            subject: subject.into(),
            html: html.into(),
            invite: None,
        }
    }

    /// Sets the sender display name.
    #[must_use]
    pub fn from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = Some(name.into());
        self
    }

    /// Sets the recipient display name.
    #[must_use]
    pub fn to_name(mut self, name: impl Into<String>) -> Self {
        self.to_name = Some(name.into());
        self
    }

    /// Attaches a calendar invite, switching the body to multipart/mixed.
    #[must_use]
    pub fn invite(mut self, invite: CalendarInvite) -> Self {
        self.invite = Some(invite);
        self
    }

    /// Returns true when the message carries an attachment.
    #[must_use]
    pub const fn has_invite(&self) -> bool {
        self.invite.is_some()
    }

    /// Renders the complete message with the given Date header value.
    ///
    /// # Errors
    ///
    /// Returns an error if a required address is empty.
    pub fn render(&self, date: DateTime<Utc>) -> Result<String> {
        if self.from_address.is_empty() {
            return Err(Error::MissingField("from address"));
        }
        if self.to_address.is_empty() {
            return Err(Error::MissingField("to address"));
        }

        let mut headers = Headers::new();
        headers.set("Date", date.to_rfc2822());
        headers.set(
            "From",
            format_mailbox(self.from_name.as_deref(), &self.from_address),
        );
        headers.set(
            "To",
            format_mailbox(self.to_name.as_deref(), &self.to_address),
        );
        headers.set("Subject", encode_word(&self.subject));
        headers.set("MIME-Version", "1.0");

        let mut message = String::new();
        match &self.invite {
            None => {
                headers.set("Content-Type", "text/html; charset=UTF-8");
                headers.set("Content-Transfer-Encoding", "8bit");
                headers.write_to(&mut message);
                message.push_str("\r\n");
                message.push_str(&self.html);
            }
            Some(invite) => {
                let token = boundary();
                headers.set(
                    "Content-Type",
                    format!("multipart/mixed; boundary=\"{token}\""),
                );
                headers.write_to(&mut message);
                message.push_str("\r\n");

                message.push_str(&format!("--{token}\r\n"));
                message.push_str("Content-Type: text/html; charset=UTF-8\r\n\r\n");
                message.push_str(&self.html);
                message.push_str("\r\n");

                message.push_str(&format!("--{token}\r\n"));
                message.push_str(&format!("Content-Type: {}\r\n", invite.mime_type));
                message.push_str(&format!(
                    "Content-Disposition: attachment; filename=\"{}\"\r\n\r\n",
                    invite.filename
                ));
                message.push_str(&invite.content);
                message.push_str("\r\n");

                message.push_str(&format!("--{token}--\r\n"));
            }
        }

        Ok(message)
    }

    /// Returns the log-facing body snapshot: the HTML with an attachment
    /// marker appended instead of the raw payload.
    #[must_use]
    pub fn snapshot(&self) -> String {
        match &self.invite {
            None => self.html.clone(),
            Some(invite) => format!("{}\n\n[attachment: {}]", self.html, invite.filename),
        }
    }
}

/// Formats a mailbox for a From/To header, encoding non-ASCII display names
/// and quoting ASCII names that contain specials.
fn format_mailbox(name: Option<&str>, address: &str) -> String {
    match name {
        Some(n) if !n.is_empty() => {
            let encoded = encode_word(n);
            if encoded == n && n.contains(['(', ')', '<', '>', ',', ';', ':', '"', '@']) {
                format!("\"{}\" <{address}>", n.replace('"', "\\\""))
            } else {
                format!("{encoded} <{address}>")
            }
        }
        _ => address.to_string(),
    }
}
