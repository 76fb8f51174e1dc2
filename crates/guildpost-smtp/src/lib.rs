//! # guildpost-smtp
//!
//! SMTP submission client for the Guildpost mail transport, speaking the
//! wire protocol directly over a socket (RFC 5321).
//!
//! ## Features
//!
//! - **Linear submission sequence**: greeting, EHLO, optional STARTTLS
//!   upgrade, AUTH LOGIN, envelope, DATA, QUIT; strictly ordered,
//!   single-pass, one command in flight at a time
//! - **Stage-tagged failures**: every protocol, timeout, and transmission
//!   error names the stage it occurred in
//! - **TLS**: implicit TLS (port 465) and in-band STARTTLS upgrade
//! - **DATA framing**: CRLF normalization and dot-stuffing applied
//!   immediately before transmission
//! - **Injectable transports**: in-memory streams stand in for sockets in
//!   tests
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use guildpost_smtp::{Address, Connection};
//!
//! #[tokio::main]
//! async fn main() -> guildpost_smtp::Result<()> {
//!     let timeout = Duration::from_secs(20);
//!     let mut conn = Connection::tcp("mail.example.org", 587, timeout).await?;
//!
//!     conn.greet().await?;
//!     conn.ehlo("app.guild.example").await?;
//!     let mut conn = conn.starttls("mail.example.org", "app.guild.example").await?;
//!     conn.auth_login("events@guild.example", "secret").await?;
//!
//!     let from = Address::new("events@guild.example")?;
//!     let to = Address::new("member@example.net")?;
//!     conn.mail_from(&from).await?;
//!     conn.rcpt_to(&to).await?;
//!     conn.data("Subject: Hello\r\n\r\nSee you Thursday.\r\n").await?;
//!
//!     conn.quit().await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders
//! - [`connection`]: connection, submission sequencer, transports
//! - [`frame`]: DATA payload framing
//! - [`parser`]: reply parser
//! - [`stage`]: protocol stage names for diagnostics
//! - [`types`]: addresses, replies, extensions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod frame;
pub mod parser;
pub mod stage;
pub mod types;

pub use connection::{Connection, ServerInfo, SmtpStream, Transport, connect, connect_tls};
pub use error::{Error, Result};
pub use frame::{dot_stuff, frame_body, normalize_crlf};
pub use stage::Stage;
pub use types::{Address, AuthMechanism, Extension, Mailbox, Reply, ReplyCode};
