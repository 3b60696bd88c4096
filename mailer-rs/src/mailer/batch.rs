//! Batch Coordinator
//!
//! Dispatches a caller-ordered list of templates one at a time. Each
//! template becomes one send whose subject is the template name; the
//! configured pace elapses after every dispatch so consecutive sends never
//! land back-to-back. Sends are sequential: order stays deterministic and
//! the transport never sees concurrent traffic from one batch.

use crate::mailer::dispatcher::Dispatch;
use crate::mailer::types::{SendRequest, SendSummary};
use crate::pace::Pace;
use crate::templates::TemplateRecord;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct BatchCoordinator {
    dispatcher: Arc<dyn Dispatch>,
    pace: Pace,
}

impl BatchCoordinator {
    pub fn new(dispatcher: Arc<dyn Dispatch>, pace: Pace) -> Self {
        Self { dispatcher, pace }
    }

    /// Send every template, returning one result per template in input order
    ///
    /// A failed or aborted dispatch is recorded and the batch moves on.
    /// Counting successes is left to the caller.
    pub async fn send_batch(
        &self,
        templates: &[TemplateRecord],
        recipient: Option<&str>,
    ) -> Vec<SendSummary> {
        info!("Sending batch of {} templates", templates.len());
        let mut results = Vec::with_capacity(templates.len());

        for (index, template) in templates.iter().enumerate() {
            let request = SendRequest::new(
                recipient.map(str::to_string),
                template.name.clone(),
                template.html(),
            );

            let result = match AssertUnwindSafe(self.dispatcher.dispatch(request))
                .catch_unwind()
                .await
            {
                Ok(summary) => summary,
                Err(_) => {
                    error!("Dispatch of {} aborted unexpectedly", template.key());
                    SendSummary::fault("Unexpected error while sending")
                }
            };

            if result.success {
                info!(
                    "[{}/{}] {}: {}",
                    index + 1,
                    templates.len(),
                    template.relative_path,
                    result.message
                );
            } else {
                warn!(
                    "[{}/{}] {}: {} ({})",
                    index + 1,
                    templates.len(),
                    template.relative_path,
                    result.message,
                    result.error.as_deref().unwrap_or("no details")
                );
            }

            results.push(result);
            self.pace.wait().await;
        }

        results
    }
}
