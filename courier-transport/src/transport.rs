//! Compose-then-send execution of one message

use async_trait::async_trait;
use courier_dispatch::Executor;

use crate::{
    error::SendError,
    message::SentMessage,
    observer::{Attempt, DeliveryObserver, TracingObserver},
    traits::{Composer, SendEndpoint},
};

/// Executes mail jobs against a composer and a send endpoint
///
/// One execution is a single attempt: compose, then send. A failure at
/// either step ends the attempt and is returned unchanged.
#[derive(Debug)]
pub struct Transport<C, S, O = TracingObserver> {
    composer: C,
    endpoint: S,
    observer: O,
}

impl<C: Composer, S: SendEndpoint> Transport<C, S> {
    pub fn new(composer: C, endpoint: S) -> Self {
        Self::with_observer(composer, endpoint, TracingObserver::default())
    }
}

impl<C: Composer, S: SendEndpoint, O: DeliveryObserver> Transport<C, S, O> {
    pub const fn with_observer(composer: C, endpoint: S, observer: O) -> Self {
        Self {
            composer,
            endpoint,
            observer,
        }
    }

    pub const fn endpoint(&self) -> &S {
        &self.endpoint
    }

    pub const fn observer(&self) -> &O {
        &self.observer
    }

    /// Run a single attempt for `message`.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Composition`] if the message could not be
    /// composed and [`SendError::Transport`] if the endpoint failed.
    pub async fn send(&self, message: &C::Message) -> Result<SentMessage, SendError> {
        let mut attempt = Attempt::start();
        self.observer.attempt_started(&attempt);

        let result = self.attempt(&mut attempt, message).await;
        match &result {
            Ok(sent) => self.observer.attempt_succeeded(&attempt, sent),
            Err(error) => self.observer.attempt_failed(&attempt, error),
        }

        result
    }

    async fn attempt(
        &self,
        attempt: &mut Attempt,
        message: &C::Message,
    ) -> Result<SentMessage, SendError> {
        let composed = self.composer.compose(message).await?;
        attempt.envelope = Some(composed.envelope.clone());

        let message_id = self.endpoint.send(&composed).await?;

        Ok(SentMessage {
            message_id,
            envelope: composed.envelope,
        })
    }
}

#[async_trait]
impl<C, S, O> Executor for Transport<C, S, O>
where
    C: Composer,
    S: SendEndpoint,
    O: DeliveryObserver,
{
    type Job = C::Message;
    type Output = SentMessage;
    type Error = SendError;

    #[tracing::instrument(level = "trace", skip_all)]
    async fn execute(&self, job: C::Message) -> Result<SentMessage, SendError> {
        self.send(&job).await
    }
}
