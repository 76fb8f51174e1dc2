//! Result shapes for the detailed and simulated orchestrators.

use serde::{Deserialize, Serialize};

use crate::error::SendError;

/// Where and why a send failed, for admin-facing diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFailure {
    /// Name of the protocol stage (or pre-flight step) that failed.
    pub stage: String,
    /// Raw server reply text, when the peer produced one.
    pub server_text: Option<String>,
    /// Human-readable failure description.
    pub message: String,
}

impl From<&SendError> for DeliveryFailure {
    fn from(err: &SendError) -> Self {
        Self {
            stage: err.stage_name(),
            server_text: err.server_text(),
            message: err.to_string(),
        }
    }
}

/// Outcome of one send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// True when the full sequence completed.
    pub success: bool,
    /// Failure details, absent on success.
    pub failure: Option<DeliveryFailure>,
}

impl DeliveryReport {
    /// A successful delivery.
    #[must_use]
    pub const fn delivered() -> Self {
        Self {
            success: true,
            failure: None,
        }
    }

    /// A failed delivery.
    #[must_use]
    pub const fn failed(failure: DeliveryFailure) -> Self {
        Self {
            success: false,
            failure: Some(failure),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use guildpost_smtp::Stage;

    #[test]
    fn failure_preserves_stage_and_server_text() {
        let err = SendError::from(guildpost_smtp::Error::UnexpectedReply {
            stage: Stage::AuthPassword,
            code: 535,
            message: "5.7.8 bad credentials".into(),
        });
        let report = DeliveryReport::failed(DeliveryFailure::from(&err));

        assert!(!report.success);
        let failure = report.failure.unwrap();
        assert_eq!(failure.stage, "AUTH LOGIN password");
        assert!(failure.server_text.unwrap().starts_with("535"));
        assert!(failure.message.contains("535"));
    }

    #[test]
    fn delivered_has_no_failure() {
        let report = DeliveryReport::delivered();
        assert!(report.success);
        assert!(report.failure.is_none());
    }
}
