//! Addressing and payload types passed between composer and endpoint

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::error::CompositionError;

/// Envelope sender and recipients for one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    sender: String,
    recipients: Vec<String>,
}

impl Envelope {
    /// Build an envelope, checking that every address has a local part and
    /// a domain.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::MissingSender`] or
    /// [`CompositionError::MissingRecipients`] when either side is empty, and
    /// [`CompositionError::InvalidAddress`] for a malformed address.
    pub fn new<S, R>(sender: S, recipients: R) -> Result<Self, CompositionError>
    where
        S: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let sender = sender.into();
        if sender.trim().is_empty() {
            return Err(CompositionError::MissingSender);
        }
        validate_address(&sender)?;

        let recipients = recipients
            .into_iter()
            .map(Into::into)
            .collect::<Vec<String>>();
        if recipients.is_empty() {
            return Err(CompositionError::MissingRecipients);
        }
        for recipient in &recipients {
            validate_address(recipient)?;
        }

        Ok(Self { sender, recipients })
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// Distinct recipient domains, in first-seen order
    pub fn recipient_domains(&self) -> Vec<&str> {
        let mut domains: Vec<&str> = Vec::new();
        for domain in self.recipients.iter().filter_map(|r| domain_of(r)) {
            if !domains.contains(&domain) {
                domains.push(domain);
            }
        }
        domains
    }
}

fn domain_of(address: &str) -> Option<&str> {
    address.rsplit_once('@').map(|(_, domain)| domain)
}

fn validate_address(address: &str) -> Result<(), CompositionError> {
    match address.rsplit_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !address.contains(char::is_whitespace) =>
        {
            Ok(())
        }
        _ => Err(CompositionError::InvalidAddress(address.to_string())),
    }
}

/// A fully composed message ready for the send endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub envelope: Envelope,
    /// Raw RFC 5322 bytes
    pub raw: Arc<[u8]>,
}

impl ComposedMessage {
    pub fn new(envelope: Envelope, raw: impl Into<Arc<[u8]>>) -> Self {
        Self {
            envelope,
            raw: raw.into(),
        }
    }
}

/// Identifier assigned to a message by the remote endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a successful send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub message_id: MessageId,
    pub envelope: Envelope,
}
