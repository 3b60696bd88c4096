//! Mail Dispatcher and Batch Coordinator

pub mod batch;
pub mod dispatcher;
pub mod smtp;
pub mod transport;
pub mod types;

pub use batch::BatchCoordinator;
pub use dispatcher::{Dispatch, DispatchSettings, MailDispatcher};
pub use smtp::SmtpTransport;
pub use transport::{MailTransport, OutgoingMail};
pub use types::{RecipientOutcome, SendRequest, SendStatus, SendSummary};
