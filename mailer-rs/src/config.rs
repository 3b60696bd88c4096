use crate::error::{MailerError, Result};
use crate::pace::Pace;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub sender: SenderIdentity,
    /// Reply-To identity; the sender is used when absent
    #[serde(default)]
    pub reply_to: Option<SenderIdentity>,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Implicit TLS from the first byte (port 465)
    #[default]
    Tls,
    /// Plain connection upgraded with STARTTLS (port 587)
    StartTls,
    /// No encryption (local relays such as Mailpit)
    None,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub security: SmtpSecurity,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_timeout_ms")]
    pub connection_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub greeting_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub socket_timeout_ms: u64,
}

/// Display name and address used in From / Reply-To headers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SenderIdentity {
    #[serde(default = "default_sender_name")]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
    /// Default recipients used when a send request names none
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Configured but not consulted: failed sends are never retried
    #[serde(default = "default_retry_times")]
    pub retry_times: u32,
    /// Delay between consecutive sends, in milliseconds
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TemplatesConfig {
    /// Directory scanned by the server-side loader; empty disables it
    #[serde(default)]
    pub default_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_sender_name() -> String {
    "Email Forward".to_string()
}

fn default_retry_times() -> u32 {
    3
}

fn default_send_delay_ms() -> u64 {
    1000
}

fn default_listen_addr() -> String {
    "127.0.0.1:5173".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            security: SmtpSecurity::default(),
            username: String::new(),
            password: String::new(),
            accept_invalid_certs: true,
            connection_timeout_ms: default_timeout_ms(),
            greeting_timeout_ms: default_timeout_ms(),
            socket_timeout_ms: default_timeout_ms(),
        }
    }
}

impl SmtpConfig {
    /// Single timeout handed to the transport: the longest configured one
    pub fn timeout(&self) -> Duration {
        let ms = self
            .connection_timeout_ms
            .max(self.greeting_timeout_ms)
            .max(self.socket_timeout_ms);
        Duration::from_millis(ms)
    }
}

impl Default for SenderIdentity {
    fn default() -> Self {
        Self {
            name: default_sender_name(),
            email: String::new(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            recipients: Vec::new(),
            retry_times: default_retry_times(),
            send_delay_ms: default_send_delay_ms(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MailerError::Config(e.to_string()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| MailerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.smtp.host.trim().is_empty() {
            return Err(MailerError::Config("smtp.host must not be empty".to_string()));
        }
        if self.smtp.port == 0 {
            return Err(MailerError::Config("smtp.port must not be 0".to_string()));
        }
        match self.logging.format.as_str() {
            "pretty" | "json" | "compact" => Ok(()),
            other => Err(MailerError::Config(format!(
                "unknown logging.format '{}' (expected pretty, json or compact)",
                other
            ))),
        }
    }

    /// Reply-To identity, falling back to the sender
    pub fn reply_to(&self) -> &SenderIdentity {
        self.reply_to.as_ref().unwrap_or(&self.sender)
    }

    /// Pace applied between consecutive sends
    pub fn pace(&self) -> Pace {
        Pace::from_millis(self.delivery.send_delay_ms)
    }

    /// Configured server-side template root, if any
    pub fn template_root(&self) -> Option<&str> {
        let path = self.templates.default_path.trim();
        (!path.is_empty()).then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.smtp.host, "smtp.gmail.com");
        assert_eq!(config.smtp.port, 465);
        assert_eq!(config.smtp.security, SmtpSecurity::Tls);
        assert_eq!(config.delivery.send_delay_ms, 1000);
        assert_eq!(config.delivery.retry_times, 3);
        assert!(config.template_root().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [sender]
            email = "me@example.com"

            [delivery]
            recipients = ["a@example.com", "b@example.com"]
            send_delay_ms = 0

            [templates]
            default_path = "/srv/templates"
            "#,
        )
        .unwrap();

        assert_eq!(config.sender.name, "Email Forward");
        assert_eq!(config.sender.email, "me@example.com");
        assert_eq!(config.delivery.recipients.len(), 2);
        assert!(config.pace().is_none());
        assert_eq!(config.template_root(), Some("/srv/templates"));
        assert_eq!(config.reply_to(), &config.sender);
    }

    #[test]
    fn test_security_modes_parse() {
        let config = Config::from_toml(
            r#"
            [smtp]
            host = "localhost"
            port = 1025
            security = "none"
            "#,
        )
        .unwrap();
        assert_eq!(config.smtp.security, SmtpSecurity::None);

        let config = Config::from_toml("[smtp]\nsecurity = \"starttls\"\n").unwrap();
        assert_eq!(config.smtp.security, SmtpSecurity::StartTls);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_toml("[smtp]\nport = 0\n").is_err());
        assert!(Config::from_toml("[logging]\nformat = \"xml\"\n").is_err());
        assert!(Config::from_toml("[smtp]\nhost = \"  \"\n").is_err());
    }

    #[test]
    fn test_timeout_is_longest() {
        let mut smtp = SmtpConfig::default();
        smtp.greeting_timeout_ms = 45_000;
        assert_eq!(smtp.timeout(), Duration::from_secs(45));
    }
}
