//! Mail Dispatcher
//!
//! Sends one logical message to every effective recipient, one transport
//! call per recipient, and rolls the outcomes up into a [`SendSummary`].
//! Failures never escape as errors: a failing recipient becomes a failed
//! [`RecipientOutcome`] and the next recipient is still attempted.

use crate::config::{Config, SenderIdentity};
use crate::mailer::transport::{MailTransport, OutgoingMail};
use crate::mailer::types::{RecipientOutcome, SendRequest, SendSummary};
use crate::pace::Pace;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Dispatcher settings, derived once from [`Config`]
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub sender: SenderIdentity,
    pub reply_to: SenderIdentity,
    pub default_recipients: Vec<String>,
    /// Delay between consecutive recipients of one send
    pub pace: Pace,
}

impl DispatchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sender: config.sender.clone(),
            reply_to: config.reply_to().clone(),
            default_recipients: config.delivery.recipients.clone(),
            pace: config.pace(),
        }
    }
}

/// Something that turns a [`SendRequest`] into a [`SendSummary`]
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, request: SendRequest) -> SendSummary;
}

pub struct MailDispatcher {
    transport: Arc<dyn MailTransport>,
    settings: DispatchSettings,
}

impl MailDispatcher {
    pub fn new(transport: Arc<dyn MailTransport>, settings: DispatchSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Explicit recipient if set, otherwise the default list
    pub fn resolve_recipients(&self, request: &SendRequest) -> Vec<String> {
        match request.to.as_deref().map(str::trim).filter(|to| !to.is_empty()) {
            Some(to) => vec![to.to_string()],
            None => self
                .settings
                .default_recipients
                .iter()
                .map(|r| r.trim())
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Send `request` to every effective recipient
    ///
    /// An empty subject or body fails before any recipient is contacted.
    pub async fn send(&self, request: &SendRequest) -> SendSummary {
        if let Err(e) = request.validate() {
            warn!("Rejected send of '{}': {}", request.subject, e);
            return SendSummary::fault(e.to_string());
        }

        let recipients = self.resolve_recipients(request);
        if recipients.is_empty() {
            warn!("No recipient for '{}', nothing sent", request.subject);
            return SendSummary::no_recipient();
        }

        match AssertUnwindSafe(self.deliver_all(&recipients, request))
            .catch_unwind()
            .await
        {
            Ok(outcomes) => SendSummary::from_outcomes(outcomes),
            Err(_) => {
                error!("Delivery of '{}' aborted unexpectedly", request.subject);
                SendSummary::fault("Email delivery aborted unexpectedly")
            }
        }
    }

    async fn deliver_all(&self, recipients: &[String], request: &SendRequest) -> Vec<RecipientOutcome> {
        let mut outcomes = Vec::with_capacity(recipients.len());

        for (index, recipient) in recipients.iter().enumerate() {
            if index > 0 {
                self.settings.pace.wait().await;
            }
            outcomes.push(self.deliver_one(recipient, request).await);
        }

        outcomes
    }

    async fn deliver_one(&self, recipient: &str, request: &SendRequest) -> RecipientOutcome {
        info!("Sending email to: {}", recipient);

        let mail = OutgoingMail {
            from: self.settings.sender.clone(),
            to: recipient.to_string(),
            subject: request.subject.clone(),
            html: request.html.clone(),
            reply_to: self.settings.reply_to.clone(),
        };

        match self.transport.send(&mail).await {
            Ok(message_id) => RecipientOutcome::delivered(recipient, message_id),
            Err(e) => {
                warn!("Failed to send email to {}: {}", recipient, e);
                RecipientOutcome::failed(recipient, e.to_string())
            }
        }
    }
}

#[async_trait]
impl Dispatch for MailDispatcher {
    async fn dispatch(&self, request: SendRequest) -> SendSummary {
        self.send(&request).await
    }
}
