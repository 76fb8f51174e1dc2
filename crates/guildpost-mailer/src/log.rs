//! Attempt logging seam.
//!
//! The mailer produces one record per send attempt regardless of outcome;
//! storage and schema belong to the surrounding application. Implementations
//! must serialize their own writes.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One send attempt, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Identity the message was sent as.
    pub actor: String,
    /// Recipient envelope address.
    pub recipient_address: String,
    /// Recipient display name, when known.
    pub recipient_name: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Body snapshot (attachment marker, not raw attachment bytes).
    pub body_snapshot: String,
    /// Whether the send completed.
    pub success: bool,
    /// Failure description, if any.
    pub error: Option<String>,
    /// When the attempt finished.
    pub timestamp: DateTime<Utc>,
    /// True when no real connection was attempted.
    pub simulated: bool,
}

/// Error from an attempt-log write.
///
/// The mailer swallows these; they never surface as send failures.
#[derive(Debug, thiserror::Error)]
#[error("attempt log write failed: {0}")]
pub struct LogError(pub String);

/// Sink for send-attempt records.
pub trait AttemptLog: Send + Sync {
    /// Records one attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; callers treat this as
    /// best-effort.
    fn record(&self, record: AttemptRecord) -> Result<(), LogError>;
}

/// Default log: emits each attempt as a structured tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl AttemptLog for TracingLog {
    fn record(&self, record: AttemptRecord) -> Result<(), LogError> {
        info!(
            actor = %record.actor,
            recipient = %record.recipient_address,
            subject = %record.subject,
            success = record.success,
            error = record.error.as_deref().unwrap_or(""),
            simulated = record.simulated,
            "mail attempt"
        );
        Ok(())
    }
}

/// In-memory log for tests and demo environments.
#[derive(Debug, Default)]
pub struct MemoryLog {
    records: Mutex<Vec<AttemptRecord>>,
}

impl MemoryLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded attempts.
    #[must_use]
    pub fn records(&self) -> Vec<AttemptRecord> {
        self.records.lock().map_or_else(|_| Vec::new(), |r| r.clone())
    }

    /// Returns the number of recorded attempts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().map_or(0, |r| r.len())
    }

    /// Returns true when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttemptLog for MemoryLog {
    fn record(&self, record: AttemptRecord) -> Result<(), LogError> {
        self.records
            .lock()
            .map_err(|e| LogError(e.to_string()))?
            .push(record);
        Ok(())
    }
}
