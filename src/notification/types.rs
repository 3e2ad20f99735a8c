use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::{Accommodation, FieldRecord, SportLine};

/// The four notification flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Verification,
    Registration,
    Payment,
    Signup,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Verification => "verification",
            NotificationKind::Registration => "registration",
            NotificationKind::Payment => "payment",
            NotificationKind::Signup => "signup",
        }
    }

    /// Scope prefix of the idempotency token
    pub fn token_scope(&self) -> &'static str {
        match self {
            NotificationKind::Verification => "verify",
            NotificationKind::Registration => "registration",
            NotificationKind::Payment => "payment",
            NotificationKind::Signup => "signup",
        }
    }

    /// Failure policy for this flow
    pub fn policy(&self) -> DeliveryPolicy {
        match self {
            NotificationKind::Signup => DeliveryPolicy::BEST_EFFORT,
            _ => DeliveryPolicy::TRANSACTIONAL,
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a failed dispatch is surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    pub propagate_failure: bool,
}

impl DeliveryPolicy {
    /// Failure fails the request
    pub const TRANSACTIONAL: Self = Self {
        propagate_failure: true,
    };
    /// Failure is logged and swallowed
    pub const BEST_EFFORT: Self = Self {
        propagate_failure: false,
    };
}

/// One unit of work for the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    /// Correlation id; generated when the caller omits it
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub recipient_email: String,
    #[serde(flatten)]
    pub payload: NotificationPayload,
}

impl NotificationRequest {
    pub fn new(recipient_email: impl Into<String>, payload: NotificationPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_email: recipient_email.into(),
            payload,
        }
    }

    pub fn kind(&self) -> NotificationKind {
        self.payload.kind()
    }
}

/// Type-specific data carried by a request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "context", rename_all = "snake_case")]
pub enum NotificationPayload {
    /// Looked up in the record store; carries no caller data
    Verification,
    Registration(RegistrationDetails),
    Payment(PaymentDetails),
    Signup(SignupDetails),
}

impl NotificationPayload {
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationPayload::Verification => NotificationKind::Verification,
            NotificationPayload::Registration(_) => NotificationKind::Registration,
            NotificationPayload::Payment(_) => NotificationKind::Payment,
            NotificationPayload::Signup(_) => NotificationKind::Signup,
        }
    }
}

/// Submitted team registration form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDetails {
    pub name: String,
    pub university_name: String,
    /// Sport code of the form, e.g. `basketball_men`
    #[serde(alias = "title")]
    pub sport: String,
    #[serde(default)]
    pub coaches: Vec<FieldRecord>,
    #[serde(default)]
    pub players: Vec<FieldRecord>,
}

/// Whether a payment has been checked by the organisers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unconfirmed,
    Confirmed,
}

/// Payment date as submitted: a bare date or a full timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentDate {
    At(DateTime<Utc>),
    On(NaiveDate),
}

/// Uploaded proof of payment, base64 encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProof {
    /// Original upload name; only the extension is kept
    pub filename: String,
    pub content_base64: String,
}

/// Submitted payment form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[serde(default)]
    pub name: Option<String>,
    pub payee_name: String,
    #[serde(default)]
    pub payment_types: Vec<String>,
    pub payment_mode: String,
    #[serde(default)]
    pub sports_players: Vec<SportLine>,
    pub amount_in_numbers: f64,
    pub amount_in_words: String,
    pub transaction_id: String,
    #[serde(default, flatten)]
    pub accommodation: Accommodation,
    pub payment_date: PaymentDate,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub payment_proof: Option<PaymentProof>,
    #[serde(default)]
    pub status: PaymentStatus,
}

/// How the account was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupMethod {
    Google,
    Form,
}

impl SignupMethod {
    pub fn label(&self) -> &'static str {
        match self {
            SignupMethod::Google => "Google OAuth",
            SignupMethod::Form => "Email & Password",
        }
    }
}

/// New account details
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupDetails {
    pub name: String,
    #[serde(default)]
    pub university_name: Option<String>,
    pub signup_method: SignupMethod,
}

/// Caller-facing result code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationOutcome {
    Success,
    /// Nothing to do (e.g. email already verified)
    AlreadySatisfied,
    /// No record for the recipient
    NotFound,
    /// Record exists but lacks what the message needs
    PreconditionMissing,
    DeliveryFailed,
}

impl NotificationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationOutcome::Success => "success",
            NotificationOutcome::AlreadySatisfied => "already-satisfied",
            NotificationOutcome::NotFound => "not-found",
            NotificationOutcome::PreconditionMissing => "precondition-missing",
            NotificationOutcome::DeliveryFailed => "delivery-failed",
        }
    }
}

/// One line of process output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub outcome: NotificationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
