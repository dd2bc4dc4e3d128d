//! Observation of send attempts
//!
//! Every execution of a job is one attempt, reported as:
//! - `attempt_started`: before the message is composed
//! - `attempt_failed`: composition or transport failed
//! - `attempt_succeeded`: the endpoint returned a message id
//!
//! Observers are informational only; nothing they do changes dispatch.
//!
//! ## Redaction
//!
//! [`TracingObserver`] can redact the local part of sender and recipient
//! addresses according to its [`AuditConfig`].

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use courier_common::delivery;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::{
    error::SendError,
    message::{Envelope, SentMessage},
};

/// One execution of a job
#[derive(Debug, Clone)]
pub struct Attempt {
    /// Unique id for correlating the events of this attempt
    pub id: Ulid,
    /// Known once composition has succeeded
    pub envelope: Option<Envelope>,
    started: Instant,
}

impl Attempt {
    pub(crate) fn start() -> Self {
        Self {
            id: Ulid::new(),
            envelope: None,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Receives attempt lifecycle events
pub trait DeliveryObserver: Send + Sync + 'static {
    fn attempt_started(&self, _attempt: &Attempt) {}

    fn attempt_failed(&self, _attempt: &Attempt, _error: &SendError) {}

    fn attempt_succeeded(&self, _attempt: &Attempt, _sent: &SentMessage) {}
}

/// Discards every event
impl DeliveryObserver for () {}

impl<T: DeliveryObserver> DeliveryObserver for Arc<T> {
    fn attempt_started(&self, attempt: &Attempt) {
        (**self).attempt_started(attempt);
    }

    fn attempt_failed(&self, attempt: &Attempt, error: &SendError) {
        (**self).attempt_failed(attempt, error);
    }

    fn attempt_succeeded(&self, attempt: &Attempt, sent: &SentMessage) {
        (**self).attempt_succeeded(attempt, sent);
    }
}

/// Audit configuration for [`TracingObserver`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Emit attempt events at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Redact sender addresses (PII protection)
    #[serde(default)]
    pub redact_sender: bool,

    /// Redact recipient addresses (PII protection)
    #[serde(default)]
    pub redact_recipients: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redact_sender: false,
            redact_recipients: false,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Redact the local part of an address if `redact` is set
#[must_use]
pub fn redact_email(email: &str, redact: bool) -> String {
    if !redact {
        return email.to_string();
    }

    email
        .split_once('@')
        .map_or_else(|| "[REDACTED]".to_string(), |(_, domain)| format!("[REDACTED]@{domain}"))
}

#[must_use]
pub fn redact_emails(emails: &[String], redact: bool) -> Vec<String> {
    emails.iter().map(|e| redact_email(e, redact)).collect()
}

/// Reports attempts as `tracing` events
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    config: AuditConfig,
}

impl TracingObserver {
    #[must_use]
    pub const fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    fn addresses(&self, envelope: Option<&Envelope>) -> (String, String) {
        envelope.map_or_else(
            || (String::new(), String::new()),
            |envelope| {
                (
                    redact_email(envelope.sender(), self.config.redact_sender),
                    redact_emails(envelope.recipients(), self.config.redact_recipients).join(", "),
                )
            },
        )
    }
}

impl DeliveryObserver for TracingObserver {
    fn attempt_started(&self, attempt: &Attempt) {
        if !self.config.enabled {
            return;
        }

        delivery!(level = DEBUG, attempt = %attempt.id, "Send attempt started");
    }

    fn attempt_failed(&self, attempt: &Attempt, error: &SendError) {
        if !self.config.enabled {
            return;
        }

        let (sender, recipients) = self.addresses(attempt.envelope.as_ref());
        delivery!(
            level = WARN,
            attempt = %attempt.id,
            sender = %sender,
            recipients = %recipients,
            composition = error.is_composition(),
            error = %error,
            duration_ms = attempt.elapsed().as_secs_f64() * 1000.0,
            "Send attempt failed"
        );
    }

    fn attempt_succeeded(&self, attempt: &Attempt, sent: &SentMessage) {
        if !self.config.enabled {
            return;
        }

        let (sender, recipients) = self.addresses(Some(&sent.envelope));
        delivery!(
            level = INFO,
            attempt = %attempt.id,
            message_id = %sent.message_id,
            sender = %sender,
            recipients = %recipients,
            duration_ms = attempt.elapsed().as_secs_f64() * 1000.0,
            "Send attempt succeeded"
        );
    }
}
