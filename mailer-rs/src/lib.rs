//! mailer-rs: browse HTML email templates and send them over SMTP
//!
//! Scans a directory tree for HTML templates and dispatches them to one or
//! more recipients, individually or as a paced batch.
//!
//! # Features
//!
//! - **Template sources**: recursive scan of a configured path, or of a
//!   directory the operator grants interactively
//! - **Dispatch**: one SMTP send per recipient, rolled up into a single
//!   sent / partial / failed result
//! - **Batches**: sequential sends with a fixed delay between templates
//! - **HTTP API**: load, send and batch-send endpoints
//!
//! # Example
//!
//! ```no_run
//! use mailer_rs::config::Config;
//! use mailer_rs::mailer::{MailDispatcher, DispatchSettings, SendRequest, SmtpTransport};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let transport = Arc::new(SmtpTransport::new(&config.smtp)?);
//!     let dispatcher = MailDispatcher::new(transport, DispatchSettings::from_config(&config));
//!
//!     let summary = dispatcher
//!         .send(&SendRequest::new(None, "welcome.html", "<h1>Hello</h1>"))
//!         .await;
//!     println!("{}", summary.message);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`templates`]: Template Source Reader
//! - [`mailer`]: Mail Dispatcher, Batch Coordinator and SMTP transport
//! - [`pace`]: Send pacing
//! - [`api`]: HTTP API

pub mod api;
pub mod config;
pub mod error;
pub mod mailer;
pub mod pace;
pub mod templates;

// Re-export commonly used types
pub use config::Config;
pub use error::{MailerError, Result};
