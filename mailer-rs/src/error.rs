use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Template source unavailable: {path}: {reason}")]
    SourceUnavailable { path: String, reason: String },

    #[error("Directory access is not available: {0}")]
    CapabilityUnavailable(String),

    #[error("User cancelled selection")]
    UserCancelled,

    #[error("No recipient specified and no default recipient in config")]
    NoRecipient,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Failed to load templates: {0}")]
    TemplateLoad(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MailerError {
    /// Build a `SourceUnavailable` error for a scan root
    pub fn source_unavailable(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<lettre::address::AddressError> for MailerError {
    fn from(e: lettre::address::AddressError) -> Self {
        Self::Validation(format!("invalid address: {}", e))
    }
}

impl From<lettre::error::Error> for MailerError {
    fn from(e: lettre::error::Error) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for MailerError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MailerError>;
