mod settings;

pub use settings::{
    AttachmentConfig, BrandingConfig, DatabaseConfig, LocaleConfig, MailConfig, OtelConfig,
    PricingConfig, Settings, SmtpConfig, TemplateConfig, TlsMode,
};

#[cfg(test)]
pub(crate) use settings::test_settings;
