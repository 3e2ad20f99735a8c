//! Message assembly.
//!
//! Every outbound message gets an idempotency token derived from a stable
//! identifier and a monotonic dispatch timestamp. The token is used as the
//! `Message-ID` and repeated in `X-Entity-Ref-ID`, so two sends of the same
//! logical event never collapse into one thread in the recipient's client.

mod assembler;
mod attachment;

use std::path::PathBuf;

use thiserror::Error;

pub use assembler::{
    DispatchClock, IdempotencyKey, MessageAssembler, MessageDraft, OutboundMessage, Sender,
    ENTITY_REF_HEADER, NO_SAVE_HEADER,
};
pub use attachment::{content_type_for, Attachment, AttachmentSource, ResolvedAttachment};

/// Errors raised while assembling a message
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Attachment unavailable: {filename} ({path}): {source}", path = .path.display())]
    AttachmentUnavailable {
        filename: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),
}
