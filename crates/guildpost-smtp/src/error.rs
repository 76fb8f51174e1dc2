//! Error types for SMTP operations.

use std::io;

use crate::stage::Stage;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
///
/// Failures that occur mid-sequence carry the [`Stage`] that was in progress
/// so callers can report exactly where the exchange broke down.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Opening the socket failed (refused, unresolved host, connect timeout).
    #[error("connection failed: {0}")]
    Connect(#[source] io::Error),

    /// TLS setup or upgrade failed.
    #[error("TLS error during {stage}: {source}")]
    Tls {
        /// Stage in progress when the handshake failed.
        stage: Stage,
        /// Underlying TLS failure.
        #[source]
        source: io::Error,
    },

    /// Server replied with a code outside the allowed set for a stage.
    #[error("unexpected reply during {stage}: {code} {message}")]
    UnexpectedReply {
        /// Stage whose reply was rejected.
        stage: Stage,
        /// Numeric reply code received.
        code: u16,
        /// Full reply text (continuation lines joined).
        message: String,
    },

    /// Server rejected the presented credentials.
    #[error("authentication rejected: {code} {message}")]
    AuthRejected {
        /// Numeric reply code received (typically 535).
        code: u16,
        /// Full reply text from the server.
        message: String,
    },

    /// The stream closed before a terminal reply line arrived.
    #[error("connection closed during {stage}")]
    Disconnected {
        /// Stage in progress when the peer went away.
        stage: Stage,
    },

    /// Writing a command or payload failed (short write, broken pipe).
    #[error("write failed during {stage}: {source}")]
    Transmission {
        /// Stage in progress when the write failed.
        stage: Stage,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A socket operation exceeded the fixed per-operation deadline.
    #[error("timed out during {stage}")]
    Timeout {
        /// Stage in progress when the deadline passed.
        stage: Stage,
    },

    /// A reply line could not be parsed.
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// The server does not advertise a capability the sequence requires.
    #[error("server does not support {capability} (required for {stage})")]
    NotSupported {
        /// Stage that required the capability.
        stage: Stage,
        /// Capability keyword (e.g. "STARTTLS").
        capability: String,
    },

    /// Invalid email address.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),
}

impl Error {
    /// Returns the protocol stage this error occurred in, if known.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Connect(_) => Some(Stage::Connect),
            Self::AuthRejected { .. } => Some(Stage::AuthPassword),
            Self::Tls { stage, .. }
            | Self::UnexpectedReply { stage, .. }
            | Self::Disconnected { stage }
            | Self::Transmission { stage, .. }
            | Self::Timeout { stage }
            | Self::NotSupported { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns the raw server reply text, when the failure carries one.
    #[must_use]
    pub fn server_text(&self) -> Option<String> {
        match self {
            Self::UnexpectedReply { code, message, .. }
            | Self::AuthRejected { code, message } => Some(format!("{code} {message}")),
            _ => None,
        }
    }

    /// Returns true if this is a permanent rejection (5xx reply).
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedReply { code, .. } | Self::AuthRejected { code, .. }
                if *code >= 500 && *code < 600
        )
    }

    /// Returns true if this is a transient rejection (4xx reply).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedReply { code, .. } | Self::AuthRejected { code, .. }
                if *code >= 400 && *code < 500
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stage_is_preserved() {
        let err = Error::UnexpectedReply {
            stage: Stage::RcptTo,
            code: 550,
            message: "5.1.1 no such user".into(),
        };
        assert_eq!(err.stage(), Some(Stage::RcptTo));
        assert_eq!(err.server_text().unwrap(), "550 5.1.1 no such user");
        assert!(err.is_permanent());
        assert!(!err.is_transient());
    }

    #[test]
    fn auth_rejection_is_tagged_with_password_stage() {
        let err = Error::AuthRejected {
            code: 535,
            message: "5.7.8 bad credentials".into(),
        };
        assert_eq!(err.stage(), Some(Stage::AuthPassword));
        assert!(err.is_permanent());
    }

    #[test]
    fn timeout_has_no_server_text() {
        let err = Error::Timeout {
            stage: Stage::Greeting,
        };
        assert_eq!(err.server_text(), None);
        assert_eq!(err.stage(), Some(Stage::Greeting));
    }
}
