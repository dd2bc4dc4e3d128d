#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use courier_transport::{
    Attempt, ComposedMessage, Composer, CompositionError, DeliveryObserver, Envelope, MessageId,
    SendEndpoint, SendError, SentMessage, TransportError,
};
use parking_lot::Mutex;

/// A plain-text mail as submitted by callers
#[derive(Debug, Clone)]
pub struct TestMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl TestMail {
    pub fn new(to: &str, subject: &str) -> Self {
        Self {
            from: "sender@example.org".to_string(),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            body: "Test message content".to_string(),
        }
    }
}

/// Renders a minimal RFC 5322 message
#[derive(Debug, Default)]
pub struct PlainComposer;

#[async_trait]
impl Composer for PlainComposer {
    type Message = TestMail;

    async fn compose(&self, mail: &TestMail) -> Result<ComposedMessage, CompositionError> {
        let envelope = Envelope::new(mail.from.clone(), mail.to.clone())?;
        if !mail.subject.is_ascii() {
            return Err(CompositionError::Encoding(
                "non-ascii subject".to_string(),
            ));
        }

        let raw = format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\n\r\n{}\r\n",
            mail.from,
            mail.to.join(", "),
            mail.subject,
            mail.body
        );

        Ok(ComposedMessage::new(envelope, raw.into_bytes()))
    }
}

/// Accepts everything except recipients at `reject.example.com`
#[derive(Debug, Default)]
pub struct MockEndpoint {
    latency: Duration,
    sent: Mutex<Vec<ComposedMessage>>,
    calls: AtomicUsize,
}

impl MockEndpoint {
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<ComposedMessage> {
        self.sent.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SendEndpoint for MockEndpoint {
    async fn send(&self, message: &ComposedMessage) -> Result<MessageId, TransportError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if message
            .envelope
            .recipient_domains()
            .contains(&"reject.example.com")
        {
            return Err(TransportError::Rejected {
                code: 554,
                message: "Message rejected".to_string(),
            });
        }

        self.sent.lock().push(message.clone());
        Ok(MessageId::new(format!("msg-{call}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Started,
    Failed { composition: bool },
    Succeeded(MessageId),
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Observed>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Observed> {
        self.events.lock().clone()
    }
}

impl DeliveryObserver for RecordingObserver {
    fn attempt_started(&self, attempt: &Attempt) {
        assert!(attempt.envelope.is_none());
        self.events.lock().push(Observed::Started);
    }

    fn attempt_failed(&self, _attempt: &Attempt, error: &SendError) {
        self.events.lock().push(Observed::Failed {
            composition: error.is_composition(),
        });
    }

    fn attempt_succeeded(&self, attempt: &Attempt, sent: &SentMessage) {
        assert_eq!(attempt.envelope.as_ref(), Some(&sent.envelope));
        self.events
            .lock()
            .push(Observed::Succeeded(sent.message_id.clone()));
    }
}
