//! Builds outbound messages with idempotency headers and resolved attachments

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::attachment::{Attachment, ResolvedAttachment};
use super::AssemblyError;
use crate::config::MailConfig;

/// Header carrying the idempotency token besides `Message-ID`
pub const ENTITY_REF_HEADER: &str = "X-Entity-Ref-ID";

/// Header asking Gmail not to keep a copy in the sender's Sent folder
pub const NO_SAVE_HEADER: &str = "X-Gm-NoSave";

/// Millisecond clock that never returns the same value twice
#[derive(Debug, Default)]
pub struct DispatchClock {
    last: AtomicI64,
}

impl DispatchClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current wall-clock millis, bumped past the previous reading if needed
    pub fn next_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(previous + 1)
    }
}

/// Stable identity of a logical notification event.
///
/// Combined with the dispatch clock it yields a token that is unique per
/// dispatch yet still carries the identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyKey {
    scope: String,
    stable_id: String,
}

impl IdempotencyKey {
    /// `scope` names the notification type (`verify`, `signup`, …);
    /// `stable_id` is a verification id, transaction id or recipient
    pub fn new(scope: impl Into<String>, stable_id: impl AsRef<str>) -> Self {
        Self {
            scope: scope.into(),
            stable_id: sanitize(stable_id.as_ref()),
        }
    }

    pub fn stable_id(&self) -> &str {
        &self.stable_id
    }

    /// `<{scope}-{stable_id}-{millis}@{domain}>`
    pub fn token(&self, millis: i64, domain: &str) -> String {
        format!("<{}-{}-{}@{}>", self.scope, self.stable_id, millis, domain)
    }
}

/// Restrict to characters valid in a Message-ID left-hand side
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Sender shown in the `From` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub name: String,
    pub address: String,
}

/// Everything the composer decides about a message
#[derive(Debug, Clone)]
pub struct MessageDraft {
    /// Overrides the default sender display name
    pub sender_name: Option<String>,
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<Attachment>,
}

/// A fully assembled message, independent of the transport
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// Idempotency token, also used as `Message-ID`
    pub message_id: String,
    pub from: Sender,
    pub to: String,
    pub subject: String,
    /// Extra headers in insertion order
    pub headers: Vec<(String, String)>,
    pub html_body: String,
    pub attachments: Vec<ResolvedAttachment>,
}

impl OutboundMessage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Turns drafts into outbound messages
pub struct MessageAssembler {
    sender: Sender,
    message_id_domain: String,
    clock: Arc<DispatchClock>,
}

impl MessageAssembler {
    pub fn new(sender: Sender, message_id_domain: impl Into<String>) -> Self {
        Self {
            sender,
            message_id_domain: message_id_domain.into(),
            clock: Arc::new(DispatchClock::new()),
        }
    }

    pub fn from_config(config: &MailConfig, sender_name: &str) -> Self {
        Self::new(
            Sender {
                name: sender_name.to_string(),
                address: config.from_address.clone(),
            },
            config.message_id_domain.clone(),
        )
    }

    /// Validate the recipient, resolve attachments and stamp idempotency headers
    pub async fn assemble(
        &self,
        draft: MessageDraft,
        key: &IdempotencyKey,
    ) -> Result<OutboundMessage, AssemblyError> {
        let recipient = draft.recipient.trim().to_string();
        if recipient.parse::<lettre::Address>().is_err() {
            return Err(AssemblyError::InvalidRecipient(draft.recipient));
        }

        let mut attachments = Vec::with_capacity(draft.attachments.len());
        for attachment in draft.attachments {
            attachments.push(attachment.resolve().await?);
        }

        let message_id = key.token(self.clock.next_millis(), &self.message_id_domain);
        let headers = vec![
            (NO_SAVE_HEADER.to_string(), "1".to_string()),
            (ENTITY_REF_HEADER.to_string(), message_id.clone()),
        ];

        let from = Sender {
            name: draft.sender_name.unwrap_or_else(|| self.sender.name.clone()),
            address: self.sender.address.clone(),
        };

        tracing::debug!(
            message_id = %message_id,
            to = %recipient,
            attachments = attachments.len(),
            "Message assembled"
        );

        Ok(OutboundMessage {
            message_id,
            from,
            to: recipient,
            subject: draft.subject,
            headers,
            html_body: draft.html_body,
            attachments,
        })
    }
}
