//! Protocol stage names for diagnostics.

use std::fmt;

/// A step in the SMTP submission sequence.
///
/// Every protocol, timeout, and transmission error is tagged with the stage
/// that was in progress, so operators can see exactly where a send failed
/// (e.g. "AUTH LOGIN failed: 535 5.7.8 bad credentials").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Opening the TCP (or implicit-TLS) connection.
    Connect,
    /// Waiting for the server's 220 greeting.
    Greeting,
    /// EHLO capability negotiation.
    Ehlo,
    /// STARTTLS command exchange.
    StartTls,
    /// TLS handshake after an accepted STARTTLS.
    TlsHandshake,
    /// Repeated EHLO on the freshly encrypted channel.
    EhloAfterTls,
    /// AUTH LOGIN initiation.
    AuthInitiate,
    /// Base64 username line.
    AuthUsername,
    /// Base64 password line.
    AuthPassword,
    /// MAIL FROM envelope command.
    MailFrom,
    /// RCPT TO envelope command.
    RcptTo,
    /// DATA command.
    Data,
    /// Message payload transfer and its 250 acknowledgement.
    Message,
    /// QUIT termination.
    Quit,
}

impl Stage {
    /// Returns the operator-facing name of the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Greeting => "greeting",
            Self::Ehlo => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::TlsHandshake => "TLS handshake",
            Self::EhloAfterTls => "EHLO after STARTTLS",
            Self::AuthInitiate => "AUTH LOGIN",
            Self::AuthUsername => "AUTH LOGIN username",
            Self::AuthPassword => "AUTH LOGIN password",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Data => "DATA",
            Self::Message => "message transfer",
            Self::Quit => "QUIT",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_operator_names() {
        assert_eq!(Stage::Greeting.to_string(), "greeting");
        assert_eq!(Stage::AuthInitiate.to_string(), "AUTH LOGIN");
        assert_eq!(Stage::RcptTo.to_string(), "RCPT TO");
        assert_eq!(Stage::Message.to_string(), "message transfer");
    }
}
