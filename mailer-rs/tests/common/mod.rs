//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use mailer_rs::config::SenderIdentity;
use mailer_rs::mailer::{DispatchSettings, MailTransport, OutgoingMail};
use mailer_rs::pace::Pace;
use mailer_rs::{MailerError, Result};
use std::sync::Mutex;
use tokio::time::Instant;

/// Transport that records every send and fails for chosen subjects
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(OutgoingMail, Instant)>>,
    fail_subjects: Vec<String>,
}

impl RecordingTransport {
    pub fn failing_on(subjects: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_subjects: subjects.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<(OutgoingMail, Instant)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<String> {
        self.sent.lock().unwrap().push((mail.clone(), Instant::now()));
        if self.fail_subjects.contains(&mail.subject) {
            return Err(MailerError::Transport("535 authentication failed".to_string()));
        }
        Ok(format!("<{}@test>", self.sent_count()))
    }

    async fn verify(&self) -> Result<()> {
        Ok(())
    }
}

pub fn settings(recipients: &[&str], pace: Pace) -> DispatchSettings {
    let sender = SenderIdentity {
        name: "Email Forward".to_string(),
        email: "sender@example.com".to_string(),
    };
    DispatchSettings {
        sender: sender.clone(),
        reply_to: sender,
        default_recipients: recipients.iter().map(|r| r.to_string()).collect(),
        pace,
    }
}
