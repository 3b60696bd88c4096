//! Send requests and their results

use crate::error::{MailerError, Result};
use serde::{Deserialize, Serialize};

/// One logical send: a subject and HTML body for one or more recipients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Explicit recipient; `None` means the configured default list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub subject: String,
    pub html: String,
}

impl SendRequest {
    pub fn new(to: Option<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to,
            subject: subject.into(),
            html: html.into(),
        }
    }

    /// Build a request from possibly missing fields
    ///
    /// `subject` and `html` must be present and non-empty; `to` may be
    /// left out to fall back on the default recipients.
    pub fn from_parts(
        to: Option<String>,
        subject: Option<String>,
        html: Option<String>,
    ) -> Result<Self> {
        require_fields(subject.as_deref(), html.as_deref())?;

        Ok(Self {
            to: to.filter(|v| !v.trim().is_empty()),
            subject: subject.unwrap_or_default(),
            html: html.unwrap_or_default(),
        })
    }

    /// Check that subject and body are non-empty
    pub fn validate(&self) -> Result<()> {
        require_fields(Some(&self.subject), Some(&self.html))
    }
}

fn require_fields(subject: Option<&str>, html: Option<&str>) -> Result<()> {
    let present = |field: Option<&str>| field.is_some_and(|v| !v.trim().is_empty());

    let mut missing = Vec::new();
    if !present(subject) {
        missing.push("subject");
    }
    if !present(html) {
        missing.push("html");
    }
    if missing.is_empty() {
        return Ok(());
    }

    Err(MailerError::Validation(format!(
        "Missing required parameters: {}",
        missing.join(", ")
    )))
}

/// Outcome of delivering to a single recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientOutcome {
    pub recipient: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecipientOutcome {
    pub fn delivered(recipient: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            success: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn failed(recipient: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Rolled-up outcome of one logical send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    /// Every recipient accepted the message
    Sent,
    /// Some recipients accepted it, some failed
    Partial,
    /// No recipient accepted it
    Failed,
    /// There was nobody to send to
    NoRecipient,
}

/// Aggregated result across all recipients of one send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSummary {
    pub success: bool,
    pub status: SendStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<RecipientOutcome>,
}

impl SendSummary {
    /// Aggregate per-recipient outcomes
    pub fn from_outcomes(outcomes: Vec<RecipientOutcome>) -> Self {
        if outcomes.is_empty() {
            return Self::no_recipient();
        }

        let succeeded = outcomes.iter().filter(|o| o.success).count();
        let failed = outcomes.len() - succeeded;
        let errors = outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| format!("{}: {}", o.recipient, o.error.as_deref().unwrap_or("unknown error")))
            .collect::<Vec<_>>()
            .join("; ");

        let (status, message) = if failed == 0 {
            (
                SendStatus::Sent,
                format!("Email sent successfully to {} recipient(s)", succeeded),
            )
        } else if succeeded == 0 {
            (
                SendStatus::Failed,
                format!("Failed to send email to {} recipient(s)", failed),
            )
        } else {
            (
                SendStatus::Partial,
                format!(
                    "Email sent to {} recipient(s), {} failed",
                    succeeded, failed
                ),
            )
        };

        Self {
            success: status != SendStatus::Failed,
            status,
            message,
            error: (!errors.is_empty()).then_some(errors),
            recipients: outcomes,
        }
    }

    pub fn no_recipient() -> Self {
        Self {
            success: false,
            status: SendStatus::NoRecipient,
            message: "Failed to send".to_string(),
            error: Some(MailerError::NoRecipient.to_string()),
            recipients: Vec::new(),
        }
    }

    /// The send was aborted as a whole
    pub fn fault(error: impl Into<String>) -> Self {
        Self {
            success: false,
            status: SendStatus::Failed,
            message: "Failed to send email".to_string(),
            error: Some(error.into()),
            recipients: Vec::new(),
        }
    }

    pub fn is_partial(&self) -> bool {
        self.status == SendStatus::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_delivered() {
        let summary = SendSummary::from_outcomes(vec![
            RecipientOutcome::delivered("a@x.com", "<1@x.com>"),
            RecipientOutcome::delivered("b@x.com", "<2@x.com>"),
        ]);
        assert!(summary.success);
        assert_eq!(summary.status, SendStatus::Sent);
        assert!(summary.message.contains('2'));
        assert!(summary.error.is_none());
    }

    #[test]
    fn test_partial_keeps_success_with_error() {
        let summary = SendSummary::from_outcomes(vec![
            RecipientOutcome::delivered("a@x.com", "<1@x.com>"),
            RecipientOutcome::failed("b@x.com", "550 mailbox unavailable"),
        ]);
        assert!(summary.success);
        assert!(summary.is_partial());
        assert_eq!(summary.message, "Email sent to 1 recipient(s), 1 failed");
        assert_eq!(summary.error.as_deref(), Some("b@x.com: 550 mailbox unavailable"));
    }

    #[test]
    fn test_all_failed() {
        let summary = SendSummary::from_outcomes(vec![
            RecipientOutcome::failed("a@x.com", "timeout"),
            RecipientOutcome::failed("b@x.com", "refused"),
        ]);
        assert!(!summary.success);
        assert_eq!(summary.status, SendStatus::Failed);
        assert_eq!(summary.error.as_deref(), Some("a@x.com: timeout; b@x.com: refused"));
    }

    #[test]
    fn test_from_parts_reports_missing_fields() {
        let err = SendRequest::from_parts(None, None, Some("<p>x</p>".to_string())).unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: Missing required parameters: subject");

        let err = SendRequest::from_parts(None, Some(" ".to_string()), None).unwrap_err();
        assert!(err.to_string().contains("subject, html"));

        let request = SendRequest::from_parts(
            Some("".to_string()),
            Some("Hello".to_string()),
            Some("<p>x</p>".to_string()),
        )
        .unwrap();
        assert_eq!(request.to, None);
    }

    #[test]
    fn test_validate_rejects_empty_body() {
        let request = SendRequest::new(None, "welcome.html", "");
        let err = request.validate().unwrap_err();
        assert!(matches!(err, MailerError::Validation(_)));
        assert!(err.to_string().ends_with("Missing required parameters: html"));

        assert!(SendRequest::new(None, "welcome.html", "<p>x</p>").validate().is_ok());
    }

    #[test]
    fn test_summary_json_shape() {
        let json = serde_json::to_value(SendSummary::no_recipient()).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["status"], "no_recipient");
        assert!(json.get("recipients").is_none());
    }
}
