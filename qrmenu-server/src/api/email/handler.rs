//! Bulk mail handlers

use axum::{Json, extract::State};
use shared::error::{AppError, ErrorCode};
use shared::models::{BulkEmailRequest, BulkEmailResponse, EmailTemplate};

use crate::email::{marketing_template, send_bulk};
use crate::error::ApiResult;
use crate::state::AppState;

/// Upper bound on recipients per request
const MAX_RECIPIENTS: usize = 500;

/// GET /api/v1/email/template
pub async fn template() -> Json<EmailTemplate> {
    Json(marketing_template())
}

/// POST /api/v1/email/send
///
/// One send per address, sequentially and without retries. The response
/// lists the outcome of every recipient.
pub async fn send(
    State(state): State<AppState>,
    Json(req): Json<BulkEmailRequest>,
) -> ApiResult<BulkEmailResponse> {
    if req.recipients.is_empty() {
        return Err(
            AppError::with_message(ErrorCode::RequiredField, "recipients is required").into(),
        );
    }
    if req.recipients.len() > MAX_RECIPIENTS {
        return Err(AppError::new(ErrorCode::ValueOutOfRange)
            .with_detail("max", MAX_RECIPIENTS)
            .into());
    }
    let subject = req.subject.trim();
    if subject.is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "subject is required").into());
    }

    let html = match req.html.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
        Some(custom) => custom.to_string(),
        None => marketing_template().html,
    };

    let results = send_bulk(state.mailer.as_ref(), &req.recipients, subject, &html).await;
    let response = BulkEmailResponse::from_results(results);

    tracing::info!(sent = response.sent, failed = response.failed, "Bulk email finished");
    Ok(Json(response))
}
