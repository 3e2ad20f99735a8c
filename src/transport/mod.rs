//! Mail transports.
//!
//! A transport takes an assembled [`OutboundMessage`] and makes exactly one
//! delivery attempt. Retries and failure policy belong to the dispatcher.

mod memory;
mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SmtpConfig;
use crate::message::OutboundMessage;

pub use memory::MemoryMailTransport;
pub use smtp::{to_lettre_message, SmtpMailTransport};

/// Errors that can occur while handing a message to the mail server.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Transport could not be built from configuration
    #[error("Transport configuration error: {0}")]
    Configuration(String),

    /// Message could not be encoded for the wire
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Server rejected the message or the connection failed
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

impl TransportError {
    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Configuration(_) => "configuration",
            TransportError::InvalidMessage(_) => "invalid_message",
            TransportError::Delivery(_) => "delivery",
        }
    }
}

/// Sends one message per call.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError>;

    /// Transport name for logging
    fn name(&self) -> &'static str;
}

/// Build the SMTP transport. Fails at startup on unusable configuration.
pub fn create_mail_transport(
    config: &SmtpConfig,
) -> Result<Arc<dyn MailTransport>, TransportError> {
    let transport = SmtpMailTransport::from_config(config)?;
    Ok(Arc::new(transport))
}
