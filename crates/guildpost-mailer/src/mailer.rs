//! Send orchestration.
//!
//! One parameterized pipeline drives the whole submission sequence; the
//! three entry points differ only in how much failure detail they surface.
//! Every entry point closes its connection on every exit path and writes
//! exactly one attempt record, with logger failures swallowed.

use std::sync::Arc;

use chrono::Utc;
use guildpost_mime::{CalendarInvite, MessageSpec};
use guildpost_smtp::{Address, Mailbox};
use rand::Rng;
use tracing::{debug, warn};

use crate::config::{MailerConfig, Security, SimulationConfig};
use crate::connector::{Connector, TcpConnector};
use crate::error::SendError;
use crate::log::{AttemptLog, AttemptRecord, TracingLog};
use crate::report::{DeliveryFailure, DeliveryReport};

/// Outbound mail client for one configured account.
///
/// Each send call is independent: it opens its own connection, runs the
/// sequence once with no retries, and closes the connection before
/// returning. Concurrency across recipients is the caller's loop.
pub struct Mailer<C: Connector = TcpConnector> {
    config: MailerConfig,
    connector: C,
    log: Arc<dyn AttemptLog>,
    simulation: SimulationConfig,
}

impl Mailer<TcpConnector> {
    /// Creates a mailer that dials real sockets.
    #[must_use]
    pub fn new(config: MailerConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> Mailer<C> {
    /// Creates a mailer with an injected connector.
    #[must_use]
    pub fn with_connector(config: MailerConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            log: Arc::new(TracingLog),
            simulation: SimulationConfig::default(),
        }
    }

    /// Replaces the attempt log.
    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn AttemptLog>) -> Self {
        self.log = log;
        self
    }

    /// Replaces the simulation parameters.
    #[must_use]
    pub const fn with_simulation(mut self, simulation: SimulationConfig) -> Self {
        self.simulation = simulation;
        self
    }

    /// Sends an HTML message, collapsing every failure to `false`.
    pub async fn send_basic(&self, to: &Mailbox, subject: &str, html: &str) -> bool {
        self.send_detailed(to, subject, html, None).await.success
    }

    /// Sends an HTML message, optionally with a calendar invite, preserving
    /// the failing stage and raw server text for diagnostics.
    pub async fn send_detailed(
        &self,
        to: &Mailbox,
        subject: &str,
        html: &str,
        invite: Option<CalendarInvite>,
    ) -> DeliveryReport {
        let spec = self.compose(to, subject, html, invite);
        let result = self.deliver(to, &spec).await;

        self.log_attempt(
            to,
            subject,
            spec.snapshot(),
            result.as_ref().err().map(ToString::to_string),
            false,
        );

        match result {
            Ok(()) => DeliveryReport::delivered(),
            Err(err) => DeliveryReport::failed(DeliveryFailure::from(&err)),
        }
    }

    /// Pretends to send: no socket is ever opened. A fixed artificial delay
    /// and a configurable failure probability exercise calling UI and
    /// error-handling paths in demo environments.
    pub async fn send_simulated(
        &self,
        to: &Mailbox,
        subject: &str,
        html: &str,
        invite: Option<CalendarInvite>,
    ) -> DeliveryReport {
        let spec = self.compose(to, subject, html, invite);

        tokio::time::sleep(self.simulation.delay).await;

        let failed = self.simulation.failure_probability > 0.0
            && rand::thread_rng().r#gen::<f64>() < self.simulation.failure_probability;
        let error = failed.then(|| "simulated delivery failure".to_string());

        self.log_attempt(
            to,
            subject,
            format!("[simulated] {}", spec.snapshot()),
            error.clone(),
            true,
        );

        if let Some(message) = error {
            DeliveryReport::failed(DeliveryFailure {
                stage: "simulated".to_string(),
                server_text: None,
                message,
            })
        } else {
            DeliveryReport::delivered()
        }
    }

    fn compose(
        &self,
        to: &Mailbox,
        subject: &str,
        html: &str,
        invite: Option<CalendarInvite>,
    ) -> MessageSpec {
        let mut spec = MessageSpec::new(
            &self.config.from_address,
            to.address.as_str(),
            subject,
            html,
        );
        if let Some(name) = &self.config.from_name {
            spec = spec.from_name(name);
        }
        if let Some(name) = &to.name {
            spec = spec.to_name(name);
        }
        if let Some(invite) = invite {
            spec = spec.invite(invite);
        }
        spec
    }

    /// The one submission pipeline shared by the real entry points.
    ///
    /// The connection is owned here and dropped (closed) on every error
    /// path; QUIT runs only after a fully successful sequence.
    async fn deliver(&self, to: &Mailbox, spec: &MessageSpec) -> Result<(), SendError> {
        self.config.validate().map_err(SendError::Config)?;

        let message = spec.render(Utc::now())?;
        let from = Address::new(&self.config.from_address).map_err(SendError::Smtp)?;

        let mut conn = self.connector.connect(&self.config).await?;
        conn.greet().await?;
        conn.ehlo(&self.config.client_name).await?;

        let mut conn = if self.config.security == Security::StartTls {
            conn.starttls(&self.config.host, &self.config.client_name)
                .await?
        } else {
            conn
        };

        conn.auth_login(&self.config.username, &self.config.password)
            .await?;
        conn.mail_from(&from).await?;
        conn.rcpt_to(&to.address).await?;
        conn.data(&message).await?;
        conn.quit().await?;

        debug!(recipient = %to.address, "delivered");
        Ok(())
    }

    fn log_attempt(
        &self,
        to: &Mailbox,
        subject: &str,
        body_snapshot: String,
        error: Option<String>,
        simulated: bool,
    ) {
        let record = AttemptRecord {
            actor: self.config.from_address.clone(),
            recipient_address: to.address.as_str().to_string(),
            recipient_name: to.name.clone(),
            subject: subject.to_string(),
            body_snapshot,
            success: error.is_none(),
            error,
            timestamp: Utc::now(),
            simulated,
        };

        if let Err(err) = self.log.record(record) {
            warn!(error = %err, "attempt log write failed");
        }
    }
}
