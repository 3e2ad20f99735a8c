//! SMTP transport built on lettre.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::{ContentType, HeaderName, HeaderValue};
use lettre::message::{Attachment as MimeAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{MailTransport, TransportError};
use crate::config::{SmtpConfig, TlsMode};
use crate::message::{OutboundMessage, ResolvedAttachment};

/// Production transport wrapping `AsyncSmtpTransport<Tokio1Executor>`.
pub struct SmtpMailTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailTransport {
    /// Build the transport from the TLS policy, credentials and timeout.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, TransportError> {
        let host = config.host.trim();
        if host.is_empty() {
            return Err(TransportError::Configuration(
                "smtp.host is empty".to_string(),
            ));
        }

        let builder = match config.tls {
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
            TlsMode::Starttls => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .tls(Tls::Required(tls_parameters(host, config)?)),
            TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .tls(Tls::Wrapper(tls_parameters(host, config)?)),
        }
        .port(config.port);

        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            (None, None) => builder,
            _ => {
                return Err(TransportError::Configuration(
                    "smtp.username and smtp.password must be set together".to_string(),
                ))
            }
        };

        let builder = match config.timeout_seconds {
            Some(seconds) => builder.timeout(Some(Duration::from_secs(seconds))),
            None => builder,
        };

        tracing::info!(
            host = %host,
            port = config.port,
            tls = ?config.tls,
            "SMTP transport configured"
        );

        Ok(Self {
            inner: builder.build(),
            host: host.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

fn tls_parameters(host: &str, config: &SmtpConfig) -> Result<TlsParameters, TransportError> {
    let mut builder = TlsParameters::builder(host.to_string());
    if config.accept_invalid_certs {
        builder = builder.dangerous_accept_invalid_certs(true);
    }
    builder
        .build()
        .map_err(|e| TransportError::Configuration(format!("TLS configuration error: {}", e)))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        let email = to_lettre_message(message)?;
        self.inner
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| TransportError::Delivery(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

/// Encode an outbound message as a lettre [`Message`].
///
/// Inline attachments go into a `multipart/related` part next to the HTML
/// body; regular attachments wrap that in `multipart/mixed`.
pub fn to_lettre_message(message: &OutboundMessage) -> Result<Message, TransportError> {
    let from_address: Address = message
        .from
        .address
        .parse()
        .map_err(|e| TransportError::InvalidMessage(format!("from address: {}", e)))?;
    let to_address: Address = message
        .to
        .parse()
        .map_err(|e| TransportError::InvalidMessage(format!("to address: {}", e)))?;

    let mut builder = Message::builder()
        .from(Mailbox::new(Some(message.from.name.clone()), from_address))
        .to(Mailbox::new(None, to_address))
        .subject(message.subject.clone())
        .message_id(Some(message.message_id.clone()));

    for (name, value) in &message.headers {
        let header_name = HeaderName::new_from_ascii(name.clone())
            .map_err(|e| TransportError::InvalidMessage(format!("header {}: {}", name, e)))?;
        builder = builder.raw_header(HeaderValue::new(header_name, value.clone()));
    }

    let result = if message.attachments.is_empty() {
        builder
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())
    } else {
        let (inline, attached): (Vec<&ResolvedAttachment>, Vec<&ResolvedAttachment>) =
            message.attachments.iter().partition(|a| a.is_inline());

        let mut related = MultiPart::related().singlepart(SinglePart::html(message.html_body.clone()));
        for attachment in inline {
            related = related.singlepart(mime_part(attachment)?);
        }

        if attached.is_empty() {
            builder.multipart(related)
        } else {
            let mut mixed = MultiPart::mixed().multipart(related);
            for attachment in attached {
                mixed = mixed.singlepart(mime_part(attachment)?);
            }
            builder.multipart(mixed)
        }
    };

    result.map_err(|e| TransportError::InvalidMessage(e.to_string()))
}

fn mime_part(attachment: &ResolvedAttachment) -> Result<SinglePart, TransportError> {
    let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
        TransportError::InvalidMessage(format!(
            "content type {} for {}: {}",
            attachment.content_type, attachment.filename, e
        ))
    })?;

    let builder = match &attachment.content_id {
        Some(content_id) => MimeAttachment::new_inline(content_id.clone()),
        None => MimeAttachment::new(attachment.filename.clone()),
    };
    Ok(builder.body(attachment.content.clone(), content_type))
}
