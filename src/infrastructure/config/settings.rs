use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Process-wide configuration, built once at startup and shared by reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub smtp: SmtpConfig,
    pub mail: MailConfig,
    #[serde(default)]
    pub templates: TemplateConfig,
    #[serde(default)]
    pub branding: BrandingConfig,
    #[serde(default)]
    pub attachments: AttachmentConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub otel: OtelConfig,
    /// Sport code to display name (e.g. `basketball_men` -> `Basketball (Men)`)
    #[serde(default)]
    pub sports: HashMap<String, String>,
}

/// TLS policy for the SMTP connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plain connection (local relays such as Mailpit)
    None,
    /// Upgrade with STARTTLS (port 587)
    #[default]
    Starttls,
    /// Implicit TLS (port 465)
    Tls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub tls: TlsMode,
    /// Skip certificate verification (self-signed relays)
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Socket timeout in seconds; unset keeps the transport default
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Envelope and header sender address
    pub from_address: String,
    /// Right-hand side of generated Message-IDs
    #[serde(default = "default_message_id_domain")]
    pub message_id_domain: String,
    /// Public site root, used for verification and dashboard links (trailing slash)
    pub root_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateConfig {
    #[serde(default = "default_template_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrandingConfig {
    #[serde(default = "default_event_name")]
    pub event_name: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    /// Inline logo embedded in the signup mail
    pub logo_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentConfig {
    /// PDF with bank transfer details sent with registration confirmations
    pub bank_details_pdf: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Registration fee per player, in whole currency units
    #[serde(default = "default_per_player_fee")]
    pub per_player_fee: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocaleConfig {
    /// IANA timezone used for every rendered date
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_message_id_domain() -> String {
    "agneepath.co.in".to_string()
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_event_name() -> String {
    "Agneepath 7.0".to_string()
}

fn default_sender_name() -> String {
    "Agneepath".to_string()
}

fn default_per_player_fee() -> u64 {
    800
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_pool_size() -> u32 {
    5
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "registration-mailer".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    /// Load settings from config files and the environment.
    ///
    /// Sources, later wins: built-in defaults, `config/default`,
    /// `config/{RUN_MODE}`, `MAILER_*` variables (`__` nests, e.g.
    /// `MAILER_SMTP__PORT`), then the conventional `SMTP_HOST`, `SMTP_PORT`,
    /// `SMTP_USER`, `SMTP_PASS`, `ROOT_URL`, `LOGO` and `BANK_DETAILS_PDF`.
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("smtp.port", 587)?
            .set_default("templates.dir", "templates")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(
                Environment::with_prefix("MAILER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("smtp.host", env::var("SMTP_HOST").ok())?
            .set_override_option("smtp.port", env::var("SMTP_PORT").ok())?
            .set_override_option("smtp.username", env::var("SMTP_USER").ok())?
            .set_override_option("smtp.password", env::var("SMTP_PASS").ok())?
            .set_override_option("mail.from_address", env::var("SMTP_USER").ok())?
            .set_override_option("mail.root_url", env::var("ROOT_URL").ok())?
            .set_override_option("branding.logo_path", env::var("LOGO").ok())?
            .set_override_option(
                "attachments.bank_details_pdf",
                env::var("BANK_DETAILS_PDF").ok(),
            )?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject configurations the transport or renderer cannot work with.
    ///
    /// Missing credentials are a startup failure, never a per-message one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp.host.trim().is_empty() {
            return Err(ConfigError::Message(
                "smtp.host is required (SMTP_HOST)".to_string(),
            ));
        }

        let has_username = self.smtp.username.as_deref().is_some_and(|u| !u.is_empty());
        let has_password = self.smtp.password.as_deref().is_some_and(|p| !p.is_empty());
        if !has_username || !has_password {
            return Err(ConfigError::Message(
                "smtp.username and smtp.password are required (SMTP_USER, SMTP_PASS)".to_string(),
            ));
        }

        if !self.mail.from_address.contains('@') {
            return Err(ConfigError::Message(format!(
                "mail.from_address is not an email address: {}",
                self.mail.from_address
            )));
        }

        if self.mail.root_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "mail.root_url is required (ROOT_URL)".to_string(),
            ));
        }

        if self.locale.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::Message(format!(
                "locale.timezone is not a known IANA zone: {}",
                self.locale.timezone
            )));
        }

        Ok(())
    }

    /// Parsed display timezone. Falls back to UTC only if `validate` was skipped.
    pub fn timezone(&self) -> chrono_tz::Tz {
        self.locale.timezone.parse().unwrap_or(chrono_tz::UTC)
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: default_template_dir(),
        }
    }
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            event_name: default_event_name(),
            sender_name: default_sender_name(),
            logo_path: None,
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            per_player_fee: default_per_player_fee(),
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> Settings {
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
        templates: TemplateConfig::default(),
        branding: BrandingConfig::default(),
        attachments: AttachmentConfig::default(),
        pricing: PricingConfig::default(),
        locale: LocaleConfig::default(),
        database: None,
        otel: OtelConfig::default(),
        sports: HashMap::from([("basketball_men".to_string(), "Basketball (Men)".to_string())]),
    }
}
