//! Mail transport capability

use crate::config::SenderIdentity;
use crate::error::Result;
use async_trait::async_trait;

/// A single message addressed to a single recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: SenderIdentity,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub reply_to: SenderIdentity,
}

/// Channel delivering one message to one address
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver `mail`, returning its message id
    async fn send(&self, mail: &OutgoingMail) -> Result<String>;

    /// Check that the remote end accepts connections
    async fn verify(&self) -> Result<()>;
}
