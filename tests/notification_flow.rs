//! End-to-end notification flows
//!
//! These tests run the orchestrator against the shipped templates with the
//! in-memory record store and transport; no SMTP server or database needed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use registration_mailer::config::{
    AttachmentConfig, BrandingConfig, LocaleConfig, MailConfig, OtelConfig, PricingConfig,
    Settings, SmtpConfig, TemplateConfig, TlsMode,
};
use registration_mailer::content::{Accommodation, FieldRecord, SportLine};
use registration_mailer::notification::{
    NotificationOutcome, NotificationPayload, NotificationRequest, NotificationService,
    PaymentDate, PaymentDetails, PaymentStatus, RegistrationDetails, SignupDetails, SignupMethod,
};
use registration_mailer::records::{MemoryRecordStore, UserRecord};
use registration_mailer::template::create_template_store;
use registration_mailer::transport::MemoryMailTransport;

fn shipped_templates() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn test_settings(template_dir: PathBuf) -> Settings {
    Settings {
        smtp: SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: Some("mailer@example.com".to_string()),
            password: Some("secret".to_string()),
            tls: TlsMode::Starttls,
            accept_invalid_certs: false,
            timeout_seconds: None,
        },
        mail: MailConfig {
            from_address: "mailer@example.com".to_string(),
            message_id_domain: "example.com".to_string(),
            root_url: "https://example.com/".to_string(),
        },
        templates: TemplateConfig { dir: template_dir },
        branding: BrandingConfig::default(),
        attachments: AttachmentConfig::default(),
        pricing: PricingConfig::default(),
        locale: LocaleConfig::default(),
        database: None,
        otel: OtelConfig::default(),
        sports: HashMap::from([(
            "basketball_men".to_string(),
            "Basketball (Men)".to_string(),
        )]),
    }
}

struct TestEnvironment {
    service: NotificationService,
    transport: Arc<MemoryMailTransport>,
    records: Arc<MemoryRecordStore>,
}

fn environment_with(settings: Settings) -> TestEnvironment {
    let transport = Arc::new(MemoryMailTransport::new());
    let records = Arc::new(MemoryRecordStore::new());
    let templates = create_template_store(&settings.templates);
    let service = NotificationService::new(&settings, templates, records.clone(), transport.clone());

    TestEnvironment {
        service,
        transport,
        records,
    }
}

fn environment() -> TestEnvironment {
    environment_with(test_settings(shipped_templates()))
}

fn registration_details() -> RegistrationDetails {
    let mut coach = FieldRecord::new();
    coach.insert("name".to_string(), json!("Grace Hopper"));
    coach.insert("phoneNumber".to_string(), json!("9876543210"));

    let mut player = FieldRecord::new();
    player.insert("name".to_string(), json!("Ada Lovelace"));
    player.insert("date_of_birth".to_string(), json!("2004-05-17"));

    RegistrationDetails {
        name: "Ada".to_string(),
        university_name: "Ashoka University".to_string(),
        sport: "basketball_men".to_string(),
        coaches: vec![coach],
        players: vec![player],
    }
}

fn payment_details() -> PaymentDetails {
    PaymentDetails {
        name: Some("Ada".to_string()),
        payee_name: "Ada Lovelace".to_string(),
        payment_types: vec!["Registration".to_string()],
        payment_mode: "UPI".to_string(),
        sports_players: vec![SportLine {
            sport: "basketball_men".to_string(),
            players: 3,
        }],
        amount_in_numbers: 2400.0,
        amount_in_words: "two thousand four hundred".to_string(),
        transaction_id: "TXN123".to_string(),
        accommodation: Accommodation::default(),
        payment_date: PaymentDate::On(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()),
        remarks: None,
        payment_proof: None,
        status: PaymentStatus::Unconfirmed,
    }
}

// ============================================================================
// Verification
// ============================================================================

#[tokio::test]
async fn test_verification_sends_link() {
    let env = environment();
    env.records.upsert(
        UserRecord::new("ada@example.com")
            .with_verification_id("vid-1")
            .with_display_name("Ada"),
    );

    let outcome = env.service.send_verification("ada@example.com").await.unwrap();
    assert_eq!(outcome, NotificationOutcome::Success);

    let sent = env.transport.sent().await;
    assert_eq!(sent.len(), 1);
    let message = &sent[0];
    assert_eq!(message.subject, "Verify your account - Agneepath 7.0");
    assert_eq!(message.from.name, "Agneepath");
    assert!(message.message_id.starts_with("<verify-vid-1-"));
    assert!(message.message_id.ends_with("@example.com>"));
    assert_eq!(message.header("X-Gm-NoSave"), Some("1"));
    assert_eq!(message.header("X-Entity-Ref-ID"), Some(message.message_id.as_str()));
    assert!(message
        .html_body
        .contains("https://example.com/Verification/verify?e="));
    assert!(message.html_body.contains("Hi Ada,"));
    assert!(!message.html_body.contains("{{"));
}

#[tokio::test]
async fn test_verified_record_is_already_satisfied() {
    let env = environment();
    env.records
        .upsert(UserRecord::new("ada@example.com").with_verification_id("vid-1").verified());

    let outcome = env.service.send_verification("ada@example.com").await.unwrap();

    assert_eq!(outcome, NotificationOutcome::AlreadySatisfied);
    assert_eq!(env.transport.attempts(), 0);
}

#[tokio::test]
async fn test_missing_verification_id_is_precondition_missing() {
    let env = environment();
    env.records.upsert(UserRecord::new("ada@example.com"));

    let outcome = env.service.send_verification("ada@example.com").await.unwrap();

    assert_eq!(outcome, NotificationOutcome::PreconditionMissing);
    assert_eq!(env.transport.attempts(), 0);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let env = environment();

    let outcome = env.service.send_verification("nobody@example.com").await.unwrap();

    assert_eq!(outcome, NotificationOutcome::NotFound);
    assert_eq!(env.transport.attempts(), 0);
}

#[tokio::test]
async fn test_repeated_verification_uses_distinct_tokens() {
    let env = environment();
    env.records
        .upsert(UserRecord::new("ada@example.com").with_verification_id("vid-1"));

    env.service.send_verification("ada@example.com").await.unwrap();
    env.service.send_verification("ada@example.com").await.unwrap();

    let sent = env.transport.sent().await;
    assert_eq!(sent.len(), 2);
    assert_ne!(sent[0].message_id, sent[1].message_id);
}

#[tokio::test]
async fn test_verification_delivery_failure_is_surfaced() {
    let env = environment();
    env.records
        .upsert(UserRecord::new("ada@example.com").with_verification_id("vid-1"));
    env.transport.set_failing(true);

    let request = NotificationRequest::new("ada@example.com", NotificationPayload::Verification);
    let response = env.service.process(&request).await;

    assert_eq!(response.outcome, NotificationOutcome::DeliveryFailed);
    assert!(response.error.is_some());
}

// ============================================================================
// Signup
// ============================================================================

#[tokio::test]
async fn test_signup_renders_defaults() {
    let env = environment();
    let details = SignupDetails {
        name: "Ada".to_string(),
        university_name: None,
        signup_method: SignupMethod::Google,
    };

    let outcome = env.service.send_signup("ada@example.com", &details).await.unwrap();
    assert_eq!(outcome, NotificationOutcome::Success);

    let sent = env.transport.sent().await;
    let body = &sent[0].html_body;
    assert!(body.contains("Not provided yet"));
    assert!(body.contains("Google OAuth"));
    assert!(body.contains("already verified"));
    assert!(body.contains("https://example.com/dashboard"));
    assert!(sent[0].message_id.starts_with("<signup-ada_example.com-"));
}

#[tokio::test]
async fn test_failing_signup_still_succeeds() {
    let env = environment();
    env.transport.set_failing(true);

    let request = NotificationRequest::new(
        "ada@example.com",
        NotificationPayload::Signup(SignupDetails {
            name: "Ada".to_string(),
            university_name: Some("Ashoka University".to_string()),
            signup_method: SignupMethod::Form,
        }),
    );
    let response = env.service.process(&request).await;

    assert_eq!(response.outcome, NotificationOutcome::Success);
    assert!(response.error.is_none());
    assert_eq!(env.transport.attempts(), 1);
    assert_eq!(env.service.dispatcher_stats().total_swallowed, 1);
}

#[tokio::test]
async fn test_signup_with_missing_template_fails() {
    let dir = tempfile::tempdir().unwrap();
    let env = environment_with(test_settings(dir.path().to_path_buf()));

    let request = NotificationRequest::new(
        "ada@example.com",
        NotificationPayload::Signup(SignupDetails {
            name: "Ada".to_string(),
            university_name: None,
            signup_method: SignupMethod::Form,
        }),
    );
    let response = env.service.process(&request).await;

    assert_eq!(response.outcome, NotificationOutcome::DeliveryFailed);
    assert!(response.error.is_some());
    assert_eq!(env.transport.attempts(), 0);
}

#[tokio::test]
async fn test_signup_with_missing_logo_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = test_settings(shipped_templates());
    settings.branding.logo_path = Some(dir.path().join("missing-logo.png"));
    let env = environment_with(settings);

    let details = SignupDetails {
        name: "Ada".to_string(),
        university_name: None,
        signup_method: SignupMethod::Google,
    };
    let err = env
        .service
        .send_signup("ada@example.com", &details)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "attachment_unavailable");
    assert_eq!(env.transport.attempts(), 0);
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_registration_renders_tables_and_attachment() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("bank.pdf");
    std::fs::write(&pdf, b"%PDF-1.4").unwrap();

    let mut settings = test_settings(shipped_templates());
    settings.attachments.bank_details_pdf = Some(pdf);
    let env = environment_with(settings);

    let outcome = env
        .service
        .send_registration("ada@example.com", &registration_details())
        .await
        .unwrap();
    assert_eq!(outcome, NotificationOutcome::Success);

    let sent = env.transport.sent().await;
    let message = &sent[0];
    assert_eq!(
        message.subject,
        "Thank you for registering for Agneepath 7.0 (Ashoka University)"
    );
    assert_eq!(message.from.name, "Registration");
    assert_eq!(message.attachments.len(), 1);
    assert_eq!(message.attachments[0].filename, "BankDetails.pdf");
    assert_eq!(message.attachments[0].content, b"%PDF-1.4");

    let body = &message.html_body;
    assert!(body.contains("Basketball (Men)"));
    assert!(body.contains("Coach Information"));
    assert!(body.contains("Player 1 Information"));
    assert!(body.contains("Phone Number"));
    assert!(body.contains("May 17, 2004"));
    assert!(body.contains("<li>BankDetails.pdf</li>"));
}

#[tokio::test]
async fn test_failing_registration_fails() {
    let env = environment();
    env.transport.set_failing(true);

    let request = NotificationRequest::new(
        "ada@example.com",
        NotificationPayload::Registration(registration_details()),
    );
    let response = env.service.process(&request).await;

    assert_eq!(response.outcome, NotificationOutcome::DeliveryFailed);
    assert!(response.error.unwrap().contains("registration"));
}

#[tokio::test]
async fn test_missing_attachment_fails_before_dispatch() {
    let mut settings = test_settings(shipped_templates());
    settings.attachments.bank_details_pdf = Some(PathBuf::from("/nonexistent/BankDetails.pdf"));
    let env = environment_with(settings);

    let result = env
        .service
        .send_registration("ada@example.com", &registration_details())
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.code(), "attachment_unavailable");
    assert_eq!(env.transport.attempts(), 0);
}

// ============================================================================
// Payment
// ============================================================================

#[tokio::test]
async fn test_payment_cost_breakdown() {
    let env = environment();

    let outcome = env
        .service
        .send_payment("ada@example.com", &payment_details())
        .await
        .unwrap();
    assert_eq!(outcome, NotificationOutcome::Success);

    let sent = env.transport.sent().await;
    let message = &sent[0];
    assert_eq!(message.subject, "Payment Confirmation - Transaction ID: TXN123");
    assert_eq!(message.from.name, "Agneepath Payments");

    let body = &message.html_body;
    assert!(body.contains("3 Players"));
    assert!(body.contains("Total Registration Fee:"));
    assert!(body.contains("₹2,400"));
    assert!(body.contains("TWO THOUSAND FOUR HUNDRED"));
    assert!(body.contains("October 18, 2026"));
    assert!(!body.contains("Accommodation</h2>"));
    assert!(!body.contains("Remarks"));
}

#[tokio::test]
async fn test_payment_with_accommodation_and_remarks() {
    let env = environment();
    let mut details = payment_details();
    details.accommodation = Accommodation {
        people: Some(4),
        price_per_person: Some(1500.0),
    };
    details.remarks = Some("Paid in two parts".to_string());
    details.status = PaymentStatus::Confirmed;

    env.service
        .send_payment("ada@example.com", &details)
        .await
        .unwrap();

    let sent = env.transport.sent().await;
    let body = &sent[0].html_body;
    assert!(body.contains("Payment confirmed"));
    assert!(body.contains("Accommodation</h2>"));
    assert!(body.contains("₹1,500"));
    assert!(body.contains("₹6,000"));
    assert!(body.contains("Paid in two parts"));
}

#[tokio::test]
async fn test_process_json_request() {
    let env = environment();
    let request: NotificationRequest = serde_json::from_value(json!({
        "type": "payment",
        "recipientEmail": "ada@example.com",
        "context": {
            "payeeName": "Ada Lovelace",
            "paymentTypes": ["Registration"],
            "paymentMode": "Bank Transfer",
            "sportsPlayers": [{"sport": "basketball_men", "players": 1}],
            "amountInNumbers": 800,
            "amountInWords": "eight hundred",
            "transactionId": "TXN-9",
            "paymentDate": "2026-10-18T10:15:00Z"
        }
    }))
    .unwrap();

    let response = env.service.process(&request).await;
    assert_eq!(response.outcome, NotificationOutcome::Success);

    let line = serde_json::to_value(&response).unwrap();
    assert_eq!(line["outcome"], "success");
    assert_eq!(line["type"], "payment");

    let sent = env.transport.sent().await;
    assert!(sent[0].html_body.contains("1 Player<"));
    assert!(sent[0].message_id.starts_with("<payment-TXN-9-"));
}
