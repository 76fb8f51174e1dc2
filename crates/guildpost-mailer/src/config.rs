//! Mailer configuration.
//!
//! Values arrive here already resolved; loading them (files, environment,
//! database) is the surrounding application's concern.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Security/encryption mode for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Security {
    /// No encryption (not recommended).
    None,
    /// Implicit TLS (connect directly with TLS).
    #[default]
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
}

impl Security {
    /// Get display name for the security mode.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::Tls => "SSL/TLS",
            Self::StartTls => "STARTTLS",
        }
    }
}

/// Configuration for one outbound mail account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Server hostname.
    pub host: String,
    /// Server port (default: 465 for TLS, 587 for STARTTLS).
    pub port: u16,
    /// Security mode.
    pub security: Security,
    /// Username for AUTH LOGIN.
    pub username: String,
    /// Password for AUTH LOGIN.
    pub password: String,
    /// Envelope sender and From header address.
    pub from_address: String,
    /// Display name for the From header.
    pub from_name: Option<String>,
    /// Fixed deadline applied to every socket operation.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
    /// Hostname presented in EHLO.
    #[serde(default = "default_client_name")]
    pub client_name: String,
}

fn default_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_client_name() -> String {
    "localhost".to_string()
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: Self::default_port(Security::Tls),
            security: Security::Tls,
            username: String::new(),
            password: String::new(),
            from_address: String::new(),
            from_name: None,
            timeout: default_timeout(),
            client_name: default_client_name(),
        }
    }
}

impl MailerConfig {
    /// Get default port for the security mode.
    #[must_use]
    pub const fn default_port(security: Security) -> u16 {
        match security {
            Security::None => 25,
            Security::StartTls => 587,
            Security::Tls => 465,
        }
    }

    /// Validate the configuration.
    ///
    /// Returns `Ok(())` if valid, or every problem at once.
    ///
    /// # Errors
    ///
    /// Returns a vector of [`ConfigError`] if any fields are invalid.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if self.host.trim().is_empty() {
            errors.push(ConfigError::EmptyHost);
        }
        if self.port == 0 {
            errors.push(ConfigError::InvalidPort);
        }
        if self.username.is_empty() {
            errors.push(ConfigError::EmptyUsername);
        }
        if self.password.is_empty() {
            errors.push(ConfigError::EmptyPassword);
        }
        if self.from_address.trim().is_empty() {
            errors.push(ConfigError::EmptyFromAddress);
        } else if !is_valid_address(&self.from_address) {
            errors.push(ConfigError::InvalidFromAddress);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn is_valid_address(addr: &str) -> bool {
    addr.split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
}

/// Validation error for mailer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// SMTP host is empty.
    EmptyHost,
    /// SMTP port is invalid.
    InvalidPort,
    /// Username is empty.
    EmptyUsername,
    /// Password is empty.
    EmptyPassword,
    /// From address is empty.
    EmptyFromAddress,
    /// From address format is invalid.
    InvalidFromAddress,
}

impl ConfigError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyHost => "SMTP server is required",
            Self::InvalidPort => "SMTP port must be 1-65535",
            Self::EmptyUsername => "SMTP username is required",
            Self::EmptyPassword => "SMTP password is required",
            Self::EmptyFromAddress => "From address is required",
            Self::InvalidFromAddress => "Invalid from address format",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyHost => "host",
            Self::InvalidPort => "port",
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
            Self::EmptyFromAddress | Self::InvalidFromAddress => "from_address",
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ConfigError {}

/// Parameters for the non-network simulation orchestrator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Artificial delay before the synthetic outcome.
    pub delay: Duration,
    /// Probability in `[0, 1]` that a simulated send reports failure.
    pub failure_probability: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            failure_probability: 0.0,
        }
    }
}
