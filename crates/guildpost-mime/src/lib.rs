//! # guildpost-mime
//!
//! MIME message composition for the Guildpost mail transport.
//!
//! ## Features
//!
//! - **Message composition**: RFC 5322 headers with deterministic ordering
//! - **Display-name encoding**: RFC 2047 encoded-words for non-ASCII names
//!   and subjects
//! - **Multipart**: multipart/mixed bodies pairing inline HTML with a
//!   calendar attachment under a random boundary
//! - **Snapshots**: log-facing body snapshots that mark attachments without
//!   embedding their payload
//!
//! ## Quick Start
//!
//! ```ignore
//! use chrono::Utc;
//! use guildpost_mime::{CalendarInvite, MessageSpec};
//!
//! let invite = CalendarInvite::new("social.ics", ics_payload);
//! let spec = MessageSpec::new(
//!     "events@guild.example",
//!     "member@example.net",
//!     "March social",
//!     "<p>See you Thursday.</p>",
//! )
//! .from_name("Events Team")
//! .invite(invite);
//!
//! let message = spec.render(Utc::now())?;
//! ```
//!
//! ## Modules
//!
//! - [`boundary`]: multipart boundary tokens
//! - [`composer`]: message spec and rendering
//! - [`encoding`]: Base64 and RFC 2047 encoded-words
//! - [`header`]: ordered header collection

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod composer;
pub mod encoding;
mod error;
pub mod header;

pub use composer::{CalendarInvite, MessageSpec};
pub use error::{Error, Result};
pub use header::Headers;
