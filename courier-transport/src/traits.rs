use async_trait::async_trait;

use crate::{
    error::{CompositionError, TransportError},
    message::{ComposedMessage, MessageId},
};

/// Produces the transmittable form of a message.
#[async_trait]
pub trait Composer: Send + Sync + 'static {
    /// Whatever callers hand to the transport
    type Message: Send + Sync + 'static;

    /// Build the envelope and raw bytes for `message`.
    ///
    /// # Errors
    ///
    /// Any [`CompositionError`] is terminal for the message.
    async fn compose(&self, message: &Self::Message) -> Result<ComposedMessage, CompositionError>;
}

/// The remote API that accepts composed messages.
#[async_trait]
pub trait SendEndpoint: Send + Sync + 'static {
    /// Hand `message` to the remote side, returning its identifier.
    ///
    /// # Errors
    ///
    /// Any [`TransportError`] is terminal for the message; the transport
    /// performs no retries of its own.
    async fn send(&self, message: &ComposedMessage) -> Result<MessageId, TransportError>;
}
