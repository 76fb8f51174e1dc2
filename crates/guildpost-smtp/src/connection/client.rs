//! SMTP connection and submission sequencer.

use std::collections::HashSet;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use super::{ServerInfo, SmtpStream, stream};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::frame::frame_body;
use crate::parser::{is_terminal_line, parse_reply};
use crate::stage::Stage;
use crate::types::{Address, Extension, Reply};

/// One SMTP connection, created per send and never reused.
///
/// The submission sequence is strictly linear and single-pass: each method
/// sends at most one command and consumes its terminal reply before
/// returning, so exactly one command is ever in flight. Any reply outside
/// the allowed set aborts the sequence with an error naming the stage;
/// dropping the connection closes the socket.
#[derive(Debug)]
pub struct Connection {
    stream: SmtpStream,
    timeout: Duration,
    server_info: ServerInfo,
    last_reply: Option<Reply>,
}

impl Connection {
    /// Opens a plaintext TCP connection (STARTTLS may upgrade it later).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or times out.
    pub async fn tcp(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let stream = stream::connect(host, port, timeout).await?;
        Ok(Self::from_stream(stream, timeout))
    }

    /// Opens an implicit-TLS connection, encrypted from the first byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or handshake fails or times out.
    pub async fn tls(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let stream = stream::connect_tls(host, port, timeout).await?;
        Ok(Self::from_stream(stream, timeout))
    }

    /// Wraps an already-open stream. Used directly by tests.
    #[must_use]
    pub fn from_stream(stream: SmtpStream, timeout: Duration) -> Self {
        Self {
            stream,
            timeout,
            server_info: ServerInfo::default(),
            last_reply: None,
        }
    }

    /// Returns the capabilities discovered so far.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Returns the most recently consumed reply.
    #[must_use]
    pub const fn last_reply(&self) -> Option<&Reply> {
        self.last_reply.as_ref()
    }

    /// Returns true once the underlying stream is encrypted.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        self.stream.is_encrypted()
    }

    /// Writes one CRLF-terminated line.
    ///
    /// # Errors
    ///
    /// Returns a transmission or timeout error tagged with `stage`.
    pub async fn write_line(&mut self, stage: Stage, line: &str) -> Result<()> {
        let mut buf = Vec::with_capacity(line.len() + 2);
        buf.extend_from_slice(line.as_bytes());
        buf.extend_from_slice(b"\r\n");
        self.write_raw(stage, &buf).await
    }

    async fn write_raw(&mut self, stage: Stage, data: &[u8]) -> Result<()> {
        tokio::time::timeout(self.timeout, self.stream.write_all(data))
            .await
            .map_err(|_| Error::Timeout { stage })?
            .map_err(|source| Error::Transmission { stage, source })
    }

    /// Reads lines until the terminal line of a (possibly multi-line) reply.
    ///
    /// # Errors
    ///
    /// Returns a timeout, disconnect, or malformed-reply error tagged with
    /// `stage`.
    pub async fn read_reply(&mut self, stage: Stage) -> Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let line = tokio::time::timeout(self.timeout, self.stream.read_line())
                .await
                .map_err(|_| Error::Timeout { stage })?
                .map_err(|_| Error::Disconnected { stage })?
                .ok_or(Error::Disconnected { stage })?;

            if line.is_empty() {
                continue;
            }

            let terminal = is_terminal_line(&line);
            lines.push(line);

            if terminal {
                break;
            }
        }

        let reply = parse_reply(&lines)?;
        debug!(stage = %stage, code = reply.code.as_u16(), "reply");
        self.last_reply = Some(reply.clone());
        Ok(reply)
    }

    /// Reads a reply and checks its code against the allowed set.
    ///
    /// # Errors
    ///
    /// Returns an error naming `stage` when the code is outside `allowed`,
    /// or when the stream closes or times out before a terminal line.
    pub async fn expect(&mut self, stage: Stage, allowed: &[u16]) -> Result<Reply> {
        let reply = self.read_reply(stage).await?;
        Self::verify(stage, reply, allowed)
    }

    /// Sends a command and consumes its terminal reply.
    ///
    /// # Errors
    ///
    /// Returns a transmission, timeout, or disconnect error tagged with
    /// `stage`.
    pub async fn command(&mut self, stage: Stage, cmd: &Command) -> Result<Reply> {
        debug!(stage = %stage, "send");
        self.write_raw(stage, &cmd.serialize()).await?;
        self.read_reply(stage).await
    }

    fn verify(stage: Stage, reply: Reply, allowed: &[u16]) -> Result<Reply> {
        if allowed.contains(&reply.code.as_u16()) {
            Ok(reply)
        } else {
            Err(Error::UnexpectedReply {
                stage,
                code: reply.code.as_u16(),
                message: reply.text(),
            })
        }
    }

    /// Consumes the 220 greeting that the server sends on connect.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting is missing or not 220.
    pub async fn greet(&mut self) -> Result<()> {
        let reply = self.expect(Stage::Greeting, &[220]).await?;
        self.server_info.hostname = reply
            .lines
            .first()
            .and_then(|line| line.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        Ok(())
    }

    /// Sends EHLO and records the advertised capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO exchange fails.
    pub async fn ehlo(&mut self, client_name: &str) -> Result<()> {
        self.ehlo_at(Stage::Ehlo, client_name).await
    }

    async fn ehlo_at(&mut self, stage: Stage, client_name: &str) -> Result<()> {
        let reply = self
            .command(
                stage,
                &Command::Ehlo {
                    hostname: client_name.to_string(),
                },
            )
            .await?;
        let reply = Self::verify(stage, reply, &[250])?;

        // First line repeats the server greeting; the rest are capabilities.
        let mut extensions = HashSet::new();
        for line in reply.lines.iter().skip(1) {
            extensions.insert(Extension::parse(line));
        }
        self.server_info.extensions = extensions;
        Ok(())
    }

    /// Upgrades to TLS via STARTTLS, then repeats EHLO on the encrypted
    /// channel. Consumes the plaintext connection and returns the upgraded
    /// one; nothing sent before this point is trusted afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not advertised, is refused, or the
    /// handshake fails. Authentication is never attempted on failure.
    pub async fn starttls(mut self, tls_hostname: &str, client_name: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported {
                stage: Stage::StartTls,
                capability: "STARTTLS".into(),
            });
        }

        let reply = self.command(Stage::StartTls, &Command::StartTls).await?;
        Self::verify(Stage::StartTls, reply, &[220])?;

        let Self {
            stream,
            timeout,
            server_info,
            ..
        } = self;
        let stream = stream.upgrade_to_tls(tls_hostname, timeout).await?;

        let mut conn = Self {
            stream,
            timeout,
            server_info,
            last_reply: None,
        };
        conn.ehlo_at(Stage::EhloAfterTls, client_name).await?;
        Ok(conn)
    }

    /// Authenticates with AUTH LOGIN: username and password sent as separate
    /// base64 lines in response to 334 challenges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthRejected`] when the server refuses the
    /// credentials, or a protocol error for any other unexpected reply.
    pub async fn auth_login(&mut self, username: &str, password: &str) -> Result<()> {
        if !self.server_info.advertises_auth_login() {
            debug!("server did not advertise AUTH LOGIN; attempting anyway");
        }

        let reply = self.command(Stage::AuthInitiate, &Command::AuthLogin).await?;
        Self::verify(Stage::AuthInitiate, reply, &[334])?;

        // Credential lines are raw base64, never logged.
        self.write_line(Stage::AuthUsername, &BASE64.encode(username))
            .await?;
        let reply = self.read_reply(Stage::AuthUsername).await?;
        Self::verify(Stage::AuthUsername, reply, &[334])?;

        self.write_line(Stage::AuthPassword, &BASE64.encode(password))
            .await?;
        let reply = self.read_reply(Stage::AuthPassword).await?;
        match reply.code.as_u16() {
            235 => Ok(()),
            code if (400..600).contains(&code) => Err(Error::AuthRejected {
                code,
                message: reply.text(),
            }),
            code => Err(Error::UnexpectedReply {
                stage: Stage::AuthPassword,
                code,
                message: reply.text(),
            }),
        }
    }

    /// Opens the envelope with MAIL FROM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not accept the sender.
    pub async fn mail_from(&mut self, from: &Address) -> Result<()> {
        let reply = self
            .command(Stage::MailFrom, &Command::MailFrom { from: from.clone() })
            .await?;
        Self::verify(Stage::MailFrom, reply, &[250])?;
        Ok(())
    }

    /// Names the one recipient with RCPT TO. 251 (forwarding) is accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not accept the recipient.
    pub async fn rcpt_to(&mut self, to: &Address) -> Result<()> {
        let reply = self
            .command(Stage::RcptTo, &Command::RcptTo { to: to.clone() })
            .await?;
        Self::verify(Stage::RcptTo, reply, &[250, 251])?;
        Ok(())
    }

    /// Runs the DATA stage: command, framed payload, `.` terminator, 250.
    ///
    /// Framing (CRLF normalization and dot-stuffing) is applied here,
    /// immediately before transmission. There is no cancellation once the
    /// payload write has begun.
    ///
    /// # Errors
    ///
    /// Returns an error if DATA is refused, the write fails, or the server
    /// rejects the message.
    pub async fn data(&mut self, message: &str) -> Result<()> {
        let reply = self.command(Stage::Data, &Command::Data).await?;
        Self::verify(Stage::Data, reply, &[354])?;

        let mut framed = frame_body(message);
        if !framed.is_empty() && !framed.ends_with("\r\n") {
            framed.push_str("\r\n");
        }
        self.write_raw(Stage::Message, framed.as_bytes()).await?;
        self.write_raw(Stage::Message, b".\r\n").await?;

        self.expect(Stage::Message, &[250]).await?;
        Ok(())
    }

    /// Sends QUIT and closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails; the socket is closed either
    /// way.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.command(Stage::Quit, &Command::Quit).await?;
        Self::verify(Stage::Quit, reply, &[221, 250])?;
        Ok(())
    }
}
