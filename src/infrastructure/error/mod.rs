use thiserror::Error;

use crate::message::AssemblyError;
use crate::records::RecordStoreError;
use crate::template::TemplateError;
use crate::transport::TransportError;

/// Unified error for the notification pipeline.
///
/// Every variant is fatal for the request that raised it. Callers see
/// `delivery-failed`; the error itself is kept for logging.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Record store error: {0}")]
    RecordStore(#[from] RecordStoreError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Delivery of {kind} notification failed: {reason}")]
    DeliveryFailed { kind: &'static str, reason: String },
}

impl NotifyError {
    /// Short label for metrics and structured logs
    pub fn code(&self) -> &'static str {
        match self {
            NotifyError::Config(_) => "config",
            NotifyError::Template(TemplateError::NotFound(_)) => "template_not_found",
            NotifyError::Template(TemplateError::Unreadable { .. }) => "template_unreadable",
            NotifyError::Template(TemplateError::Malformed { .. }) => "malformed_template",
            NotifyError::Assembly(AssemblyError::AttachmentUnavailable { .. }) => {
                "attachment_unavailable"
            }
            NotifyError::Assembly(AssemblyError::InvalidRecipient(_)) => "invalid_recipient",
            NotifyError::RecordStore(_) => "record_store",
            NotifyError::Transport(_) => "transport",
            NotifyError::InvalidPayload(_) => "invalid_payload",
            NotifyError::DeliveryFailed { .. } => "delivery_failed",
        }
    }
}

pub type NotifyResult<T> = Result<T, NotifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = NotifyError::from(TemplateError::NotFound("signup".to_string()));
        assert_eq!(err.code(), "template_not_found");
        assert!(err.to_string().contains("signup"));

        let err = NotifyError::DeliveryFailed {
            kind: "registration",
            reason: "connection refused".to_string(),
        };
        assert_eq!(err.code(), "delivery_failed");
        assert_eq!(
            err.to_string(),
            "Delivery of registration notification failed: connection refused"
        );
    }
}
