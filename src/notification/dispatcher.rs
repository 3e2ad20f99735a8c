use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::error::NotifyError;
use crate::message::OutboundMessage;
use crate::metrics::DispatchMetrics;
use crate::transport::MailTransport;

use super::NotificationKind;

/// Result of a single delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub delivered: bool,
    /// Transport error label when not delivered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchOutcome {
    fn delivered() -> Self {
        Self {
            delivered: true,
            error_kind: None,
            error: None,
        }
    }

    fn failed(kind: &str, error: String) -> Self {
        Self {
            delivered: false,
            error_kind: Some(kind.to_string()),
            error: Some(error),
        }
    }
}

/// Statistics for the delivery dispatcher
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Total delivery attempts
    pub total_attempted: AtomicU64,
    /// Attempts accepted by the transport
    pub total_delivered: AtomicU64,
    /// Attempts rejected by the transport
    pub total_failed: AtomicU64,
    /// Failures swallowed by a best-effort policy
    pub total_swallowed: AtomicU64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            total_attempted: self.total_attempted.load(Ordering::Relaxed),
            total_delivered: self.total_delivered.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
            total_swallowed: self.total_swallowed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub total_attempted: u64,
    pub total_delivered: u64,
    pub total_failed: u64,
    pub total_swallowed: u64,
}

/// Hands messages to the transport and applies the failure policy.
///
/// Exactly one attempt per message: no retry, no queue, no timeout beyond
/// what the transport itself is configured with.
pub struct DeliveryDispatcher {
    transport: Arc<dyn MailTransport>,
    stats: DispatcherStats,
}

impl DeliveryDispatcher {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport,
            stats: DispatcherStats::default(),
        }
    }

    pub fn stats(&self) -> DispatcherStatsSnapshot {
        self.stats.snapshot()
    }

    /// Make one delivery attempt and report what happened
    pub async fn attempt(&self, message: &OutboundMessage, kind: NotificationKind) -> DispatchOutcome {
        self.stats.total_attempted.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();

        match self.transport.send(message).await {
            Ok(()) => {
                self.stats.total_delivered.fetch_add(1, Ordering::Relaxed);
                DispatchMetrics::record_delivered(kind.as_str(), start.elapsed());

                tracing::info!(
                    kind = %kind,
                    message_id = %message.message_id,
                    transport = self.transport.name(),
                    "Notification delivered"
                );
                DispatchOutcome::delivered()
            }
            Err(e) => {
                self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
                DispatchMetrics::record_failed(kind.as_str(), start.elapsed());
                DispatchOutcome::failed(e.kind(), e.to_string())
            }
        }
    }

    /// Dispatch and apply the per-type policy.
    ///
    /// Transactional types turn a failed attempt into
    /// [`NotifyError::DeliveryFailed`]; best-effort types log it and return
    /// the failed outcome as `Ok`.
    #[tracing::instrument(
        name = "dispatch",
        skip(self, message),
        fields(kind = %kind, message_id = %message.message_id)
    )]
    pub async fn dispatch(
        &self,
        message: &OutboundMessage,
        kind: NotificationKind,
    ) -> Result<DispatchOutcome, NotifyError> {
        let outcome = self.attempt(message, kind).await;
        if outcome.delivered {
            return Ok(outcome);
        }

        let reason = outcome.error.clone().unwrap_or_default();
        if kind.policy().propagate_failure {
            tracing::error!(error = %reason, "Delivery failed");
            return Err(NotifyError::DeliveryFailed {
                kind: kind.as_str(),
                reason,
            });
        }

        self.stats.total_swallowed.fetch_add(1, Ordering::Relaxed);
        DispatchMetrics::record_swallowed(kind.as_str());
        tracing::warn!(error = %reason, "Best-effort delivery failed, continuing");
        Ok(outcome)
    }
}
