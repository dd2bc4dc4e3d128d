//! Rate- and concurrency-limited mail sending
//!
//! [`Courier`] composes each submitted message and hands it to a remote send
//! endpoint, admitting at most `max_concurrency` sends at once and at most
//! `max_rate` sends per second. Messages that cannot be sent yet wait in
//! submission order.

mod config;
mod courier;
mod error;

pub use config::CourierConfig;
pub use courier::Courier;
pub use courier_common::logging;
pub use courier_dispatch::{
    Completion, DispatchConfig, DispatchError, DispatchStats, Dispatcher, Executor,
};
pub use courier_transport::{
    AuditConfig, ComposedMessage, Composer, CompositionError, DeliveryObserver, Envelope,
    MessageId, SendEndpoint, SendError, SentMessage, TracingObserver, Transport, TransportError,
};
pub use error::ConfigError;
