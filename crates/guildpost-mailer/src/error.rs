//! Error types for send orchestration.

use crate::config::ConfigError;

/// Result type alias for send operations.
pub type Result<T> = std::result::Result<T, SendError>;

/// A failed send attempt.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The configuration is unusable; every problem is listed.
    #[error("invalid configuration: {}", join_config_errors(.0))]
    Config(Vec<ConfigError>),

    /// Composing the message failed before any connection was made.
    #[error("message composition failed: {0}")]
    Compose(#[from] guildpost_mime::Error),

    /// The SMTP exchange failed.
    #[error(transparent)]
    Smtp(#[from] guildpost_smtp::Error),
}

fn join_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ConfigError::message)
        .collect::<Vec<_>>()
        .join(", ")
}

impl SendError {
    /// Names the stage that failed, for diagnostics.
    #[must_use]
    pub fn stage_name(&self) -> String {
        match self {
            Self::Config(_) => "configuration".to_string(),
            Self::Compose(_) => "compose".to_string(),
            Self::Smtp(err) => err
                .stage()
                .map_or_else(|| "send".to_string(), |s| s.to_string()),
        }
    }

    /// Returns the raw server reply text, when the failure carries one.
    #[must_use]
    pub fn server_text(&self) -> Option<String> {
        match self {
            Self::Smtp(err) => err.server_text(),
            _ => None,
        }
    }
}
