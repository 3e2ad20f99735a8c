//! Per-type composition: template, context, subject and attachments.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Datelike, Utc};

use super::links::{site_url, verification_link, Base64LinkEncoder, LinkEncoder};
use super::types::{
    NotificationKind, PaymentDate, PaymentDetails, PaymentProof, PaymentStatus,
    RegistrationDetails, SignupDetails, SignupMethod,
};
use crate::config::Settings;
use crate::content::{
    AccommodationTable, AttachmentList, ContentGenerator, CostTable, EntityTable,
};
use crate::error::NotifyError;
use crate::message::{content_type_for, Attachment, IdempotencyKey};
use crate::template::{field_label, ids, Formatter, TemplateContext, Value};

/// Shown when a signup has no university yet
pub const UNIVERSITY_PLACEHOLDER: &str = "Not provided yet";

/// Content id the signup template uses for the logo (`cid:logo`)
pub const LOGO_CONTENT_ID: &str = "logo";

const BANK_DETAILS_FILENAME: &str = "BankDetails.pdf";

/// Everything needed to render and assemble one message
#[derive(Debug)]
pub struct Composition {
    pub kind: NotificationKind,
    pub template_id: &'static str,
    pub context: TemplateContext,
    pub subject: String,
    /// Overrides the default sender display name
    pub sender_name: Option<String>,
    pub attachments: Vec<Attachment>,
    pub key: IdempotencyKey,
}

/// Builds [`Composition`]s from request data and configuration.
pub struct Composer {
    formatter: Formatter,
    event_name: String,
    sender_name: String,
    root_url: String,
    logo_path: Option<PathBuf>,
    bank_details_pdf: Option<PathBuf>,
    sports: HashMap<String, String>,
    costs: CostTable,
    link_encoder: Arc<dyn LinkEncoder>,
}

impl Composer {
    pub fn from_settings(settings: &Settings) -> Self {
        let formatter = Formatter::new(settings.timezone(), settings.locale.currency_symbol.clone());
        Self {
            costs: CostTable::new(
                settings.pricing.per_player_fee,
                settings.sports.clone(),
                formatter.clone(),
            ),
            formatter,
            event_name: settings.branding.event_name.clone(),
            sender_name: settings.branding.sender_name.clone(),
            root_url: settings.mail.root_url.clone(),
            logo_path: settings.branding.logo_path.clone(),
            bank_details_pdf: settings.attachments.bank_details_pdf.clone(),
            sports: settings.sports.clone(),
            link_encoder: Arc::new(Base64LinkEncoder),
        }
    }

    /// Replace the link parameter encoder
    pub fn with_link_encoder(mut self, encoder: Arc<dyn LinkEncoder>) -> Self {
        self.link_encoder = encoder;
        self
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    fn sport_name(&self, code: &str) -> String {
        self.sports
            .get(code)
            .cloned()
            .unwrap_or_else(|| field_label(code))
    }

    pub fn verification(
        &self,
        email: &str,
        verification_id: &str,
        display_name: Option<&str>,
    ) -> Composition {
        let mut context = TemplateContext::new();
        context
            .insert(
                "verificationLink",
                verification_link(
                    self.link_encoder.as_ref(),
                    &self.root_url,
                    email,
                    verification_id,
                ),
            )
            .insert("email", email)
            .insert_or("name", display_name, "");

        Composition {
            kind: NotificationKind::Verification,
            template_id: ids::VERIFY_EMAIL,
            context,
            subject: format!("Verify your account - {}", self.event_name),
            sender_name: None,
            attachments: Vec::new(),
            key: IdempotencyKey::new(
                NotificationKind::Verification.token_scope(),
                verification_id,
            ),
        }
    }

    pub fn signup(&self, email: &str, details: &SignupDetails, now: DateTime<Utc>) -> Composition {
        let local_year = now.with_timezone(&self.formatter.timezone()).year();

        let mut context = TemplateContext::new();
        context
            .insert("name", details.name.as_str())
            .insert("email", email)
            .insert_or(
                "universityName",
                details.university_name.as_deref(),
                UNIVERSITY_PLACEHOLDER,
            )
            .insert("signupMethod", details.signup_method.label())
            .insert("isFormSignup", details.signup_method == SignupMethod::Form)
            .insert("dashboardUrl", site_url(&self.root_url, "dashboard"))
            .insert("timestamp", now)
            .insert("currentYear", local_year.to_string());

        let attachments = self
            .logo_path
            .as_deref()
            .map(|path| {
                let filename = file_name_or(path, "logo.png");
                let content_type = content_type_for(&filename);
                Attachment::from_path(filename, path, content_type).with_content_id(LOGO_CONTENT_ID)
            })
            .into_iter()
            .collect();

        Composition {
            kind: NotificationKind::Signup,
            template_id: ids::SIGNUP,
            context,
            subject: format!("Welcome to {}! 🎉", self.sender_name),
            sender_name: None,
            attachments,
            key: IdempotencyKey::new(NotificationKind::Signup.token_scope(), email),
        }
    }

    pub fn registration(&self, email: &str, details: &RegistrationDetails) -> Composition {
        let attachments: Vec<Attachment> = self
            .bank_details_pdf
            .as_deref()
            .map(|path| Attachment::from_path(BANK_DETAILS_FILENAME, path, "application/pdf"))
            .into_iter()
            .collect();
        let attachment_names: Vec<String> =
            attachments.iter().map(|a| a.filename.clone()).collect();

        let tables = EntityTable::coaches(self.formatter.clone())
            .generate(&details.coaches)
            .join(EntityTable::players(self.formatter.clone()).generate(&details.players));

        let mut context = TemplateContext::new();
        context
            .insert("name", details.name.as_str())
            .insert("sport", self.sport_name(&details.sport))
            .insert("universityName", details.university_name.as_str())
            .insert("playerAndCoachDetails", tables)
            .insert("attachmentList", AttachmentList.generate(&attachment_names));

        Composition {
            kind: NotificationKind::Registration,
            template_id: ids::REGISTRATION,
            context,
            subject: format!(
                "Thank you for registering for {} ({})",
                self.event_name, details.university_name
            ),
            sender_name: Some("Registration".to_string()),
            attachments,
            key: IdempotencyKey::new(NotificationKind::Registration.token_scope(), email),
        }
    }

    pub fn payment(&self, details: &PaymentDetails) -> Result<Composition, NotifyError> {
        let template_id = match details.status {
            PaymentStatus::Unconfirmed => ids::PAYMENT_UNCONFIRMED,
            PaymentStatus::Confirmed => ids::PAYMENT_CONFIRMED,
        };

        let payment_date = match details.payment_date {
            PaymentDate::At(at) => at.with_timezone(&self.formatter.timezone()).date_naive(),
            PaymentDate::On(date) => date,
        };

        let accommodation = AccommodationTable::new(self.formatter.clone())
            .generate(std::slice::from_ref(&details.accommodation));

        let mut context = TemplateContext::new();
        context
            .insert_or("name", details.name.as_deref(), "")
            .insert("payeeName", details.payee_name.as_str())
            .insert("paymentTypes", details.payment_types.join(", "))
            .insert("paymentMode", details.payment_mode.as_str())
            .insert("amountInNumbers", Value::Currency(details.amount_in_numbers))
            .insert("amountInWords", details.amount_in_words.to_uppercase())
            .insert("transactionId", details.transaction_id.as_str())
            .insert("paymentDate", payment_date)
            .insert("sportsTable", self.costs.generate(&details.sports_players))
            .insert("accommodationTable", accommodation)
            .insert_or("remarks", details.remarks.as_deref(), "");

        let attachments = match &details.payment_proof {
            Some(proof) => vec![proof_attachment(proof)?],
            None => Vec::new(),
        };

        Ok(Composition {
            kind: NotificationKind::Payment,
            template_id,
            context,
            subject: format!(
                "Payment Confirmation - Transaction ID: {}",
                details.transaction_id
            ),
            sender_name: Some(format!("{} Payments", self.sender_name)),
            attachments,
            key: IdempotencyKey::new(
                NotificationKind::Payment.token_scope(),
                &details.transaction_id,
            ),
        })
    }
}

/// Rename the upload to `payment-proof{ext}` and decode its bytes
fn proof_attachment(proof: &PaymentProof) -> Result<Attachment, NotifyError> {
    let content = STANDARD
        .decode(proof.content_base64.trim())
        .map_err(|e| NotifyError::InvalidPayload(format!("paymentProof: {}", e)))?;

    let extension = proof
        .filename
        .rfind('.')
        .map(|index| &proof.filename[index..])
        .unwrap_or("");
    let filename = format!("payment-proof{}", extension);
    let content_type = content_type_for(&filename);

    Ok(Attachment::from_bytes(filename, content, content_type))
}

fn file_name_or(path: &Path, fallback: &str) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(fallback)
        .to_string()
}
