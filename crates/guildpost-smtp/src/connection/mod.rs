//! SMTP connection management.

mod client;
mod stream;

pub use client::Connection;
pub use stream::{SmtpStream, Transport, connect, connect_tls};

use std::collections::HashSet;

use crate::types::{AuthMechanism, Extension};

/// Server capabilities discovered from the greeting and EHLO response.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from the greeting.
    pub hostname: String,
    /// Supported extensions.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Checks if the server supports an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks if STARTTLS is supported.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports(&Extension::StartTls)
    }

    /// Checks if the server advertises the LOGIN authentication mechanism.
    #[must_use]
    pub fn advertises_auth_login(&self) -> bool {
        self.extensions.iter().any(|ext| {
            matches!(ext, Extension::Auth(mechs) if mechs.contains(&AuthMechanism::Login))
        })
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| {
            if let Extension::Size(size) = ext {
                *size
            } else {
                None
            }
        })
    }
}
