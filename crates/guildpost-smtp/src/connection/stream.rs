//! Low-level SMTP stream handling.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    rustls::{ClientConfig, RootCertStore},
};

use crate::error::{Error, Result};
use crate::stage::Stage;

/// Byte stream usable as an SMTP transport.
///
/// Blanket-implemented; test code wires up `tokio_test::io::Mock` or
/// `tokio::io::DuplexStream` through [`SmtpStream::custom`].
pub trait Transport: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Transport for T {}

/// SMTP stream (TCP, TLS, or an injected test transport).
pub enum SmtpStream {
    /// Plain TCP connection.
    Tcp(BufReader<TcpStream>),
    /// TLS-encrypted connection.
    Tls(Box<BufReader<tokio_rustls::client::TlsStream<TcpStream>>>),
    /// Injected transport, used by tests in place of a real socket.
    Custom(BufReader<Box<dyn Transport>>),
}

impl std::fmt::Debug for SmtpStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tcp(_) => f.write_str("SmtpStream::Tcp"),
            Self::Tls(_) => f.write_str("SmtpStream::Tls"),
            Self::Custom(_) => f.write_str("SmtpStream::Custom"),
        }
    }
}

impl SmtpStream {
    /// Wraps an arbitrary transport, bypassing any real socket.
    #[must_use]
    pub fn custom(transport: impl Transport + 'static) -> Self {
        Self::Custom(BufReader::new(Box::new(transport)))
    }

    /// Returns true once the stream is encrypted.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    /// Reads one line, stripped of its CRLF. `None` signals a closed stream.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the read fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let n = match self {
            Self::Tcp(reader) => reader.read_line(&mut line).await?,
            Self::Tls(reader) => reader.read_line(&mut line).await?,
            Self::Custom(reader) => reader.read_line(&mut line).await?,
        };
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Writes and flushes raw bytes.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the write or flush fails.
    pub async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        match self {
            Self::Tcp(reader) => {
                reader.get_mut().write_all(data).await?;
                reader.get_mut().flush().await?;
            }
            Self::Tls(reader) => {
                reader.get_mut().write_all(data).await?;
                reader.get_mut().flush().await?;
            }
            Self::Custom(reader) => {
                reader.get_mut().write_all(data).await?;
                reader.get_mut().flush().await?;
            }
        }
        Ok(())
    }

    /// Upgrades a plaintext TCP stream to TLS after an accepted STARTTLS.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is not plain TCP or the handshake
    /// fails.
    pub async fn upgrade_to_tls(self, hostname: &str, timeout: Duration) -> Result<Self> {
        let Self::Tcp(reader) = self else {
            return Err(Error::Tls {
                stage: Stage::TlsHandshake,
                source: io::Error::other("stream is not upgradable plaintext TCP"),
            });
        };
        let tcp_stream = reader.into_inner();

        let connector = tls_connector();
        let server_name = server_name(hostname)?;

        let tls_stream = tokio::time::timeout(timeout, connector.connect(server_name, tcp_stream))
            .await
            .map_err(|_| Error::Timeout {
                stage: Stage::TlsHandshake,
            })?
            .map_err(|e| Error::Tls {
                stage: Stage::TlsHandshake,
                source: e,
            })?;

        Ok(Self::Tls(Box::new(BufReader::new(tls_stream))))
    }
}

/// Connects over plain TCP (ports 25/587; STARTTLS may upgrade later).
///
/// # Errors
///
/// Returns an error if the connection fails or times out.
pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<SmtpStream> {
    let stream = dial(host, port, timeout).await?;
    Ok(SmtpStream::Tcp(BufReader::new(stream)))
}

/// Connects with implicit TLS (port 465): encrypted from the first byte.
///
/// # Errors
///
/// Returns an error if the connection or TLS handshake fails or times out.
pub async fn connect_tls(host: &str, port: u16, timeout: Duration) -> Result<SmtpStream> {
    let tcp_stream = dial(host, port, timeout).await?;

    let connector = tls_connector();
    let server_name = server_name(host)?;

    let tls_stream = tokio::time::timeout(timeout, connector.connect(server_name, tcp_stream))
        .await
        .map_err(|_| Error::Timeout {
            stage: Stage::Connect,
        })?
        .map_err(|e| Error::Tls {
            stage: Stage::Connect,
            source: e,
        })?;

    Ok(SmtpStream::Tls(Box::new(BufReader::new(tls_stream))))
}

async fn dial(host: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let addr = format!("{host}:{port}");
    tokio::time::timeout(timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| Error::Timeout {
            stage: Stage::Connect,
        })?
        .map_err(Error::Connect)
}

fn server_name(hostname: &str) -> Result<ServerName<'static>> {
    ServerName::try_from(hostname.to_string()).map_err(|_| Error::Tls {
        stage: Stage::TlsHandshake,
        source: io::Error::other(format!("invalid TLS server name: {hostname:?}")),
    })
}

/// Creates a TLS connector with the webpki root certificates.
fn tls_connector() -> TlsConnector {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_line_strips_crlf() {
        let mock = tokio_test::io::Builder::new().read(b"220 ready\r\n").build();
        let mut stream = SmtpStream::custom(mock);
        assert_eq!(stream.read_line().await.unwrap().as_deref(), Some("220 ready"));
    }

    #[tokio::test]
    async fn read_line_reports_eof_as_none() {
        let mock = tokio_test::io::Builder::new().build();
        let mut stream = SmtpStream::custom(mock);
        assert_eq!(stream.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_all_passes_bytes_through() {
        let mock = tokio_test::io::Builder::new().write(b"QUIT\r\n").build();
        let mut stream = SmtpStream::custom(mock);
        stream.write_all(b"QUIT\r\n").await.unwrap();
    }

    #[tokio::test]
    async fn custom_stream_is_not_upgradable() {
        let mock = tokio_test::io::Builder::new().build();
        let stream = SmtpStream::custom(mock);
        let err = stream
            .upgrade_to_tls("mail.example.org", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Tls { stage: Stage::TlsHandshake, .. }));
    }
}
