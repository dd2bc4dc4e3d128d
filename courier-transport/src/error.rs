//! Typed errors for a single send attempt.
//!
//! An attempt fails in one of two places:
//! - Composition: the message could not be turned into bytes
//! - Transport: the remote endpoint did not accept the bytes
//!
//! Both are terminal for the message. Neither is retried here.

use thiserror::Error;

/// Top-level error for one attempt, as seen by the submitter.
#[derive(Debug, Error)]
pub enum SendError {
    /// The payload could not be produced.
    #[error("Composition failed: {0}")]
    Composition(#[from] CompositionError),

    /// The remote endpoint failed or refused the message.
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),
}

/// Errors raised while producing the payload.
#[derive(Debug, Error)]
pub enum CompositionError {
    /// The message has no envelope sender.
    #[error("Missing sender")]
    MissingSender,

    /// The message has no envelope recipients.
    #[error("Missing recipients")]
    MissingRecipients,

    /// An address could not be used.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A body or header could not be encoded.
    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("{0}")]
    Other(String),
}

/// Errors raised by the remote send endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint answered and refused the message.
    #[error("Rejected ({code}): {message}")]
    Rejected { code: u16, message: String },

    /// The endpoint could not be reached or is throttling.
    #[error("Endpoint unavailable: {0}")]
    Unavailable(String),

    /// The endpoint did not answer in time.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// I/O error talking to the endpoint.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl SendError {
    /// Returns `true` if the payload was never produced.
    #[must_use]
    pub const fn is_composition(&self) -> bool {
        matches!(self, Self::Composition(_))
    }

    /// Returns `true` if the payload was produced but not delivered.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl TransportError {
    /// Returns `true` if the endpoint explicitly refused the message.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
