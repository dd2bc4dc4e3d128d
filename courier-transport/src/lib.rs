//! Mail executor for the dispatch core
//!
//! This crate provides:
//! - The contracts for the message composer and the remote send endpoint
//! - Envelope, payload and message id types passed between them
//! - An observer hook for attempt started/failed/succeeded events
//! - [`Transport`], which implements [`courier_dispatch::Executor`]

mod error;
mod message;
pub mod observer;
mod traits;
mod transport;

pub use error::{CompositionError, SendError, TransportError};
pub use message::{ComposedMessage, Envelope, MessageId, SentMessage};
pub use observer::{Attempt, AuditConfig, DeliveryObserver, TracingObserver};
pub use traits::{Composer, SendEndpoint};
pub use transport::Transport;
