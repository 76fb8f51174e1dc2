//! # guildpost-mailer
//!
//! Outbound send orchestration for the Guildpost mail transport.
//!
//! This crate ties the wire protocol (`guildpost-smtp`) and message
//! composition (`guildpost-mime`) into three caller-facing entry points:
//!
//! - [`Mailer::send_basic`]: boolean result, every failure collapsed
//! - [`Mailer::send_detailed`]: structured [`DeliveryReport`] naming the
//!   failing protocol stage and raw server text
//! - [`Mailer::send_simulated`]: no socket, synthetic outcome for demo and
//!   test environments
//!
//! All three share one pipeline, close their connection on every exit path,
//! and write exactly one [`AttemptRecord`] per attempt.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use guildpost_mailer::{Mailer, MailerConfig, MemoryLog, Security};
//! use guildpost_smtp::Mailbox;
//!
//! let config = MailerConfig {
//!     host: "mail.example.org".into(),
//!     port: 587,
//!     security: Security::StartTls,
//!     username: "events@guild.example".into(),
//!     password: "secret".into(),
//!     from_address: "events@guild.example".into(),
//!     from_name: Some("Events Team".into()),
//!     ..MailerConfig::default()
//! };
//!
//! let mailer = Mailer::new(config);
//! let to = Mailbox::with_name("Jo Smith", "member@example.net")?;
//! let report = mailer
//!     .send_detailed(&to, "March social", "<p>See you Thursday.</p>", None)
//!     .await;
//! if !report.success {
//!     eprintln!("{:?}", report.failure);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod connector;
mod error;
pub mod log;
mod mailer;
mod report;

pub use config::{ConfigError, MailerConfig, Security, SimulationConfig};
pub use connector::{Connector, TcpConnector};
pub use error::{Result, SendError};
pub use log::{AttemptLog, AttemptRecord, LogError, MemoryLog, TracingLog};
pub use mailer::Mailer;
pub use report::{DeliveryFailure, DeliveryReport};

// Re-export the types callers need to address a message.
pub use guildpost_mime::CalendarInvite;
pub use guildpost_smtp::{Address, Mailbox};
