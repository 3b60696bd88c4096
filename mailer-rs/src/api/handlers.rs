//! API request handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::MailerError;
use crate::mailer::{
    BatchCoordinator, Dispatch, DispatchSettings, MailDispatcher, MailTransport, SendRequest,
    SendStatus, SendSummary,
};
use crate::templates::{ConfiguredTemplates, TemplateListing, TemplateRecord};

/// Shared application state
pub struct AppState {
    pub templates: ConfiguredTemplates,
    pub dispatcher: Arc<dyn Dispatch>,
    pub batch: BatchCoordinator,
    /// Set while a batch send is in flight
    batch_busy: AtomicBool,
}

impl AppState {
    pub fn new(templates: ConfiguredTemplates, dispatcher: Arc<dyn Dispatch>, batch: BatchCoordinator) -> Self {
        Self {
            templates,
            dispatcher,
            batch,
            batch_busy: AtomicBool::new(false),
        }
    }

    /// Wire the loader, dispatcher and coordinator from configuration
    pub fn from_config(config: &Config, transport: Arc<dyn MailTransport>) -> Self {
        let dispatcher: Arc<dyn Dispatch> = Arc::new(MailDispatcher::new(
            transport,
            DispatchSettings::from_config(config),
        ));
        let batch = BatchCoordinator::new(dispatcher.clone(), config.pace());

        Self::new(
            ConfiguredTemplates::new(config.template_root()),
            dispatcher,
            batch,
        )
    }

    pub fn batch_in_progress(&self) -> bool {
        self.batch_busy.load(Ordering::SeqCst)
    }

    fn try_start_batch(&self) -> Option<BatchGuard<'_>> {
        self.batch_busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BatchGuard(&self.batch_busy))
    }
}

/// Clears the busy flag when the batch finishes or unwinds
struct BatchGuard<'a>(&'a AtomicBool);

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// POST /api/send-email body
#[derive(Debug, Default, Deserialize)]
pub struct SendEmailBody {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub html: Option<String>,
}

/// POST /api/send-batch body
#[derive(Debug, Deserialize)]
pub struct SendBatchBody {
    pub templates: Vec<TemplateRecord>,
    #[serde(default)]
    pub to: Option<String>,
}

/// POST /api/send-batch response
#[derive(Debug, Serialize, Deserialize)]
pub struct SendBatchResponse {
    pub success: bool,
    pub message: String,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<SendSummary>,
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub message: String,
    pub error: String,
}

impl ApiError {
    pub fn new(message: &str, error: impl ToString) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            error: error.to_string(),
        }
    }
}

/// GET /api/health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /api/templates/load - Scan the configured template path
pub async fn load_templates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.templates.load().await {
        Ok(Some(templates)) => (StatusCode::OK, Json(TemplateListing::loaded(templates))),
        Ok(None) => (StatusCode::OK, Json(TemplateListing::unconfigured())),
        Err(e) => {
            error!("Loading templates failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(TemplateListing::failed(e)))
        }
    }
}

/// POST /api/send-email - Send one message
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendEmailBody>,
) -> impl IntoResponse {
    let request = match SendRequest::from_parts(body.to, body.subject, body.html) {
        Ok(request) => request,
        Err(e) => {
            let message = match &e {
                MailerError::Validation(reason) => reason.clone(),
                other => other.to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(ApiError::new(&message, e))).into_response();
        }
    };

    let summary = state.dispatcher.dispatch(request).await;
    let status = match summary.status {
        SendStatus::Sent | SendStatus::Partial => StatusCode::OK,
        SendStatus::NoRecipient => StatusCode::BAD_REQUEST,
        SendStatus::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(summary)).into_response()
}

/// POST /api/send-batch - Send templates one by one
pub async fn send_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendBatchBody>,
) -> impl IntoResponse {
    let Some(_guard) = state.try_start_batch() else {
        warn!("Rejected batch send: another batch is in progress");
        return (
            StatusCode::CONFLICT,
            Json(ApiError::new(
                "Batch send rejected",
                "A batch send is already in progress",
            )),
        )
            .into_response();
    };

    let results = state
        .batch
        .send_batch(&body.templates, body.to.as_deref())
        .await;

    let succeeded = results.iter().filter(|r| r.success).count();
    let failed = results.len() - succeeded;
    info!("Batch finished: {} succeeded, {} failed", succeeded, failed);

    (
        StatusCode::OK,
        Json(SendBatchResponse {
            success: failed == 0,
            message: format!("Sent {} of {} templates", succeeded, results.len()),
            succeeded,
            failed,
            results,
        }),
    )
        .into_response()
}
