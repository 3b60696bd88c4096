//! SMTP transport using lettre

use crate::config::{SenderIdentity, SmtpConfig, SmtpSecurity};
use crate::error::{MailerError, Result};
use crate::mailer::transport::{MailTransport, OutgoingMail};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Delivers mail through an SMTP relay
pub struct SmtpTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpTransport {
    /// Create a transport from configuration
    ///
    /// No connection is opened until the first send or verify.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let tls = match config.security {
            SmtpSecurity::Tls => Tls::Wrapper(Self::tls_parameters(config)?),
            SmtpSecurity::StartTls => Tls::Required(Self::tls_parameters(config)?),
            SmtpSecurity::None => Tls::None,
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(tls)
            .timeout(Some(config.timeout()));

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            inner: builder.build(),
            host: format!("{}:{}", config.host, config.port),
        })
    }

    fn tls_parameters(config: &SmtpConfig) -> Result<TlsParameters> {
        TlsParameters::builder(config.host.clone())
            .dangerous_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| MailerError::Config(format!("TLS setup failed: {}", e)))
    }

    fn mailbox(identity: &SenderIdentity) -> Result<Mailbox> {
        let address: Address = identity.email.parse()?;
        let name = (!identity.name.is_empty()).then(|| identity.name.clone());
        Ok(Mailbox::new(name, address))
    }

    /// Build the RFC 5322 message and the Message-ID it carries
    pub fn build_message(mail: &OutgoingMail) -> Result<(Message, String)> {
        let from = Self::mailbox(&mail.from)?;
        let message_id = format!("<{}@{}>", Uuid::new_v4(), from.email.domain());
        let to: Mailbox = mail.to.parse()?;

        let message = Message::builder()
            .from(from)
            .reply_to(Self::mailbox(&mail.reply_to)?)
            .to(to)
            .subject(mail.subject.clone())
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(mail.html.clone())?;

        Ok((message, message_id))
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<String> {
        let (message, message_id) = Self::build_message(mail)?;

        debug!("Sending '{}' to {} via {}", mail.subject, mail.to, self.host);
        let response = self.inner.send(message).await?;
        debug!("SMTP response code {}", response.code());

        info!("Mail sent successfully to {}", mail.to);
        Ok(message_id)
    }

    async fn verify(&self) -> Result<()> {
        if self.inner.test_connection().await? {
            Ok(())
        } else {
            Err(MailerError::Transport(format!(
                "SMTP server {} did not accept the connection",
                self.host
            )))
        }
    }
}
