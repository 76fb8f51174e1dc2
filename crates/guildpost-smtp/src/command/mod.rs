//! SMTP command builder.

use crate::types::Address;

/// SMTP command issued by the submission sequence.
///
/// Base64 credential lines for AUTH LOGIN are not commands; the connection
/// writes them as raw lines in response to 334 challenges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// EHLO - Extended greeting
    Ehlo {
        /// Client hostname
        hostname: String,
    },
    /// STARTTLS - Upgrade to TLS
    StartTls,
    /// AUTH LOGIN - Begin challenge/response authentication
    AuthLogin,
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Sender address
        from: Address,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Recipient address
        to: Address,
    },
    /// DATA - Begin message data
    Data,
    /// QUIT - Close connection
    Quit,
}

impl Command {
    /// Serializes the command to its CRLF-terminated wire form.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        match self {
            Self::Ehlo { hostname } => {
                buf.extend_from_slice(b"EHLO ");
                buf.extend_from_slice(hostname.as_bytes());
            }
            Self::StartTls => {
                buf.extend_from_slice(b"STARTTLS");
            }
            Self::AuthLogin => {
                buf.extend_from_slice(b"AUTH LOGIN");
            }
            Self::MailFrom { from } => {
                buf.extend_from_slice(b"MAIL FROM:<");
                buf.extend_from_slice(from.as_str().as_bytes());
                buf.push(b'>');
            }
            Self::RcptTo { to } => {
                buf.extend_from_slice(b"RCPT TO:<");
                buf.extend_from_slice(to.as_str().as_bytes());
                buf.push(b'>');
            }
            Self::Data => {
                buf.extend_from_slice(b"DATA");
            }
            Self::Quit => {
                buf.extend_from_slice(b"QUIT");
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ehlo() {
        let cmd = Command::Ehlo {
            hostname: "app.guild.example".to_string(),
        };
        assert_eq!(cmd.serialize(), b"EHLO app.guild.example\r\n");
    }

    #[test]
    fn starttls() {
        assert_eq!(Command::StartTls.serialize(), b"STARTTLS\r\n");
    }

    #[test]
    fn auth_login_has_no_initial_response() {
        assert_eq!(Command::AuthLogin.serialize(), b"AUTH LOGIN\r\n");
    }

    #[test]
    fn mail_from() {
        let cmd = Command::MailFrom {
            from: Address::new("events@guild.example").unwrap(),
        };
        assert_eq!(cmd.serialize(), b"MAIL FROM:<events@guild.example>\r\n");
    }

    #[test]
    fn rcpt_to() {
        let cmd = Command::RcptTo {
            to: Address::new("member@example.net").unwrap(),
        };
        assert_eq!(cmd.serialize(), b"RCPT TO:<member@example.net>\r\n");
    }

    #[test]
    fn data_and_quit() {
        assert_eq!(Command::Data.serialize(), b"DATA\r\n");
        assert_eq!(Command::Quit.serialize(), b"QUIT\r\n");
    }
}
