//! Notification orchestration.
//!
//! Each request goes through a precondition check, composition, rendering,
//! assembly and a single dispatch. The per-type [`DeliveryPolicy`] decides
//! whether a failed dispatch fails the request (verification, registration,
//! payment) or is only logged (signup).

mod compose;
mod dispatcher;
mod links;
mod service;
mod types;

pub use compose::{Composer, Composition, LOGO_CONTENT_ID, UNIVERSITY_PLACEHOLDER};
pub use dispatcher::{
    DeliveryDispatcher, DispatchOutcome, DispatcherStats, DispatcherStatsSnapshot,
};
pub use links::{site_url, verification_link, Base64LinkEncoder, LinkEncoder};
pub use service::NotificationService;
pub use types::{
    DeliveryPolicy, NotificationKind, NotificationOutcome, NotificationPayload,
    NotificationRequest, NotificationResponse, PaymentDate, PaymentDetails, PaymentProof,
    PaymentStatus, RegistrationDetails, SignupDetails, SignupMethod,
};
