use courier_common::internal;
use courier_dispatch::{Completion, DispatchStats, Dispatcher};
use courier_transport::{Composer, SendEndpoint, SendError, SentMessage, TracingObserver, Transport};

use crate::config::CourierConfig;

/// A mail transport that sends through `S` within configured limits
///
/// Messages are composed by `C` and handed to `S` in submission order, never
/// exceeding the configured concurrency or per-second rate.
#[derive(Debug)]
pub struct Courier<C: Composer, S: SendEndpoint> {
    dispatcher: Dispatcher<Transport<C, S, TracingObserver>>,
}

impl<C: Composer, S: SendEndpoint> Clone for Courier<C, S> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<C: Composer, S: SendEndpoint> Courier<C, S> {
    pub fn new(config: &CourierConfig, composer: C, endpoint: S) -> Self {
        internal!(level = INFO, "Courier starting");

        let transport = Transport::with_observer(
            composer,
            endpoint,
            TracingObserver::new(config.audit.clone()),
        );

        Self {
            dispatcher: Dispatcher::new(config.dispatch, transport),
        }
    }

    /// Queue `message` for sending.
    ///
    /// The returned [`Completion`] resolves once the message has been sent
    /// or has failed; failures are not retried.
    pub fn send(&self, message: C::Message) -> Completion<SentMessage, SendError> {
        self.dispatcher.submit(message)
    }

    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    /// Returns `true` if nothing is being sent or waiting to be sent.
    pub fn is_idle(&self) -> bool {
        self.dispatcher.is_idle()
    }

    /// Wait until every queued message has been sent or has failed.
    pub async fn idle(&self) {
        self.dispatcher.idle().await;
    }

    pub fn endpoint(&self) -> &S {
        self.dispatcher.executor().endpoint()
    }
}
