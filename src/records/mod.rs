//! Record store abstraction.
//!
//! The mailer only ever reads user records, and only by email address.
//! Two backends exist: [`MemoryRecordStore`] for tests and local runs, and
//! the Postgres adapter in [`crate::postgres`].

mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryRecordStore;

/// Errors that can occur while querying a record store.
#[derive(Debug, Error)]
pub enum RecordStoreError {
    /// Query failed in the database
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend is temporarily unavailable
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

/// The subset of a user account the verification flow needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    /// Opaque identifier embedded in the verification link
    #[serde(default, rename = "VerificationId")]
    pub verification_id: Option<String>,
    #[serde(default, rename = "name")]
    pub display_name: Option<String>,
}

impl UserRecord {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            email_verified: false,
            verification_id: None,
            display_name: None,
        }
    }

    pub fn with_verification_id(mut self, id: impl Into<String>) -> Self {
        self.verification_id = Some(id.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn verified(mut self) -> Self {
        self.email_verified = true;
        self
    }

    /// Verification id, treating an empty string as absent
    pub fn verification_id(&self) -> Option<&str> {
        self.verification_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Lookup of user records by email address.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Find a user by email. `Ok(None)` when no record exists.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RecordStoreError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
