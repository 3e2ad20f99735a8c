use std::sync::Arc;

use chrono::Utc;

use crate::config::Settings;
use crate::error::{NotifyError, NotifyResult};
use crate::message::{MessageAssembler, MessageDraft};
use crate::metrics::NotificationMetrics;
use crate::records::RecordStore;
use crate::template::{PlaceholderEngine, TemplateStore};
use crate::transport::MailTransport;

use super::compose::{Composer, Composition};
use super::dispatcher::{DeliveryDispatcher, DispatcherStatsSnapshot};
use super::links::LinkEncoder;
use super::types::{
    NotificationOutcome, NotificationPayload, NotificationRequest, NotificationResponse,
    PaymentDetails, RegistrationDetails, SignupDetails,
};

/// Runs one notification from precondition check to dispatch.
///
/// Requests are independent; the service holds only read-only state plus
/// the dispatch clock and counters, so one instance is shared across tasks.
pub struct NotificationService {
    templates: Arc<TemplateStore>,
    engine: PlaceholderEngine,
    composer: Composer,
    assembler: MessageAssembler,
    dispatcher: DeliveryDispatcher,
    records: Arc<dyn RecordStore>,
}

impl NotificationService {
    pub fn new(
        settings: &Settings,
        templates: Arc<TemplateStore>,
        records: Arc<dyn RecordStore>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        let composer = Composer::from_settings(settings);
        Self {
            templates,
            engine: PlaceholderEngine::new(composer.formatter().clone()),
            composer,
            assembler: MessageAssembler::from_config(&settings.mail, &settings.branding.sender_name),
            dispatcher: DeliveryDispatcher::new(transport),
            records,
        }
    }

    /// Replace the verification link encoder
    pub fn with_link_encoder(mut self, encoder: Arc<dyn LinkEncoder>) -> Self {
        self.composer = self.composer.with_link_encoder(encoder);
        self
    }

    pub fn dispatcher_stats(&self) -> DispatcherStatsSnapshot {
        self.dispatcher.stats()
    }

    /// Handle a request and map it to a caller-facing response.
    ///
    /// Errors become `delivery-failed`; the error text is kept in the
    /// response and logged.
    #[tracing::instrument(
        name = "notification",
        skip(self, request),
        fields(notification_id = %request.id, kind = %request.kind())
    )]
    pub async fn process(&self, request: &NotificationRequest) -> NotificationResponse {
        let email = request.recipient_email.as_str();
        let result = match &request.payload {
            NotificationPayload::Verification => self.send_verification(email).await,
            NotificationPayload::Registration(details) => {
                self.send_registration(email, details).await
            }
            NotificationPayload::Payment(details) => self.send_payment(email, details).await,
            NotificationPayload::Signup(details) => self.send_signup(email, details).await,
        };

        let (outcome, error) = match result {
            Ok(outcome) => (outcome, None),
            Err(e) => {
                tracing::error!(error = %e, code = e.code(), "Notification failed");
                (NotificationOutcome::DeliveryFailed, Some(e.to_string()))
            }
        };

        NotificationMetrics::record_outcome(request.kind().as_str(), outcome.as_str());
        tracing::info!(outcome = outcome.as_str(), "Notification processed");

        NotificationResponse {
            id: request.id,
            kind: request.kind(),
            outcome,
            error,
        }
    }

    /// Send the account verification link.
    ///
    /// Gated on the stored record: unknown users are `NotFound`, verified
    /// ones `AlreadySatisfied`, and records without a verification id
    /// `PreconditionMissing`. None of these touch the transport.
    pub async fn send_verification(&self, email: &str) -> NotifyResult<NotificationOutcome> {
        let Some(record) = self.records.find_by_email(email).await? else {
            tracing::debug!(store = self.records.name(), "No record for recipient");
            return Ok(NotificationOutcome::NotFound);
        };

        if record.email_verified {
            return Ok(NotificationOutcome::AlreadySatisfied);
        }

        let Some(verification_id) = record.verification_id() else {
            tracing::warn!("Record has no verification id");
            return Ok(NotificationOutcome::PreconditionMissing);
        };

        let composition =
            self.composer
                .verification(email, verification_id, record.display_name.as_deref());
        self.deliver(email, composition).await
    }

    pub async fn send_registration(
        &self,
        email: &str,
        details: &RegistrationDetails,
    ) -> NotifyResult<NotificationOutcome> {
        let composition = self.composer.registration(email, details);
        self.deliver(email, composition).await
    }

    pub async fn send_payment(
        &self,
        email: &str,
        details: &PaymentDetails,
    ) -> NotifyResult<NotificationOutcome> {
        let composition = self.composer.payment(details)?;
        self.deliver(email, composition).await
    }

    /// Welcome mail. A failed dispatch is logged and still reports success;
    /// template and attachment defects fail the request.
    pub async fn send_signup(
        &self,
        email: &str,
        details: &SignupDetails,
    ) -> NotifyResult<NotificationOutcome> {
        let composition = self.composer.signup(email, details, Utc::now());
        self.deliver(email, composition).await
    }

    /// Render, assemble and dispatch a composed notification
    async fn deliver(
        &self,
        recipient: &str,
        composition: Composition,
    ) -> Result<NotificationOutcome, NotifyError> {
        let template = self.templates.resolve(composition.template_id).await?;
        let html_body = self.engine.render_template(&template, &composition.context);

        let draft = MessageDraft {
            sender_name: composition.sender_name,
            recipient: recipient.to_string(),
            subject: composition.subject,
            html_body,
            attachments: composition.attachments,
        };
        let message = self.assembler.assemble(draft, &composition.key).await?;

        self.dispatcher.dispatch(&message, composition.kind).await?;
        Ok(NotificationOutcome::Success)
    }
}
