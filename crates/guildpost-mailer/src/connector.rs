//! Connection establishment seam.
//!
//! The mailer dials through a [`Connector`] so tests can substitute
//! in-memory transports and observe whether a connection was attempted
//! at all.

use guildpost_smtp::Connection;

use crate::config::{MailerConfig, Security};

/// Opens one [`Connection`] per send attempt.
pub trait Connector: Send + Sync {
    /// Dials according to the configured security mode.
    fn connect(
        &self,
        config: &MailerConfig,
    ) -> impl Future<Output = guildpost_smtp::Result<Connection>> + Send;
}

/// Real-socket connector used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    async fn connect(&self, config: &MailerConfig) -> guildpost_smtp::Result<Connection> {
        match config.security {
            Security::Tls => Connection::tls(&config.host, config.port, config.timeout).await,
            Security::StartTls | Security::None => {
                Connection::tcp(&config.host, config.port, config.timeout).await
            }
        }
    }
}
