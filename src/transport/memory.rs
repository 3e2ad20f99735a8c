//! In-memory transport that captures messages.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{MailTransport, TransportError};
use crate::message::OutboundMessage;

/// Captures every delivered message; can be switched to fail on demand.
#[derive(Default)]
pub struct MemoryMailTransport {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    attempts: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every attempt fails
    pub fn failing() -> Self {
        let transport = Self::new();
        transport.set_failing(true);
        transport
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Successfully delivered messages, oldest first
    pub async fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Number of `send` calls, including failed ones
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl MailTransport for MemoryMailTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Delivery(
                "connection refused (memory transport)".to_string(),
            ));
        }

        self.sent.lock().await.push(message.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;

    fn message() -> OutboundMessage {
        OutboundMessage {
            message_id: "<signup-a-1@example.com>".to_string(),
            from: Sender {
                name: "Agneepath".to_string(),
                address: "mailer@example.com".to_string(),
            },
            to: "ada@example.com".to_string(),
            subject: "Welcome".to_string(),
            headers: vec![],
            html_body: String::new(),
            attachments: vec![],
        }
    }

    #[tokio::test]
    async fn test_captures_messages() {
        let transport = MemoryMailTransport::new();
        transport.send(&message()).await.unwrap();

        assert_eq!(transport.sent_count().await, 1);
        assert_eq!(transport.attempts(), 1);
        assert_eq!(transport.sent().await[0].to, "ada@example.com");

        transport.clear().await;
        assert_eq!(transport.sent_count().await, 0);
    }

    #[tokio::test]
    async fn test_failing_mode() {
        let transport = MemoryMailTransport::failing();
        let err = transport.send(&message()).await.unwrap_err();

        assert!(matches!(err, TransportError::Delivery(_)));
        assert_eq!(transport.attempts(), 1);
        assert_eq!(transport.sent_count().await, 0);

        transport.set_failing(false);
        assert!(transport.send(&message()).await.is_ok());
    }
}
