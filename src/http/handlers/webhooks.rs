use crate::domain::payment::PaymentNotification;
use crate::service::reconciler::{ReconcileError, ReconcileOutcome};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Processor webhook. The origin check runs as middleware before this.
pub async fn payment_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let notification: PaymentNotification = match serde_json::from_slice(&body) {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(error = %e, "webhook body is not a valid notification");
            return reply(
                StatusCode::BAD_REQUEST,
                "Invalid request body: Could not parse JSON.",
            );
        }
    };

    match state.reconciler.reconcile(&notification).await {
        Ok(outcome) => reply(StatusCode::OK, outcome_message(&outcome)),
        Err(e) => reply(reconcile_error_status(&e), &e.to_string()),
    }
}

/// Retryable failures answer 500 so the processor redelivers.
pub fn reconcile_error_status(e: &ReconcileError) -> StatusCode {
    match e {
        ReconcileError::FetchFailed { .. } | ReconcileError::Storage { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ReconcileError::PaymentNotFound { .. } => StatusCode::NOT_FOUND,
        ReconcileError::MetadataMissing { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn outcome_message(outcome: &ReconcileOutcome) -> &'static str {
    match outcome {
        ReconcileOutcome::Filtered => "Webhook not applicable or missing data ID.",
        ReconcileOutcome::Ignored { .. } => "Webhook processed. Payment not approved.",
        ReconcileOutcome::Recorded { .. } => "Webhook processed successfully and purchase recorded.",
        ReconcileOutcome::AlreadyRecorded { .. } => {
            "Webhook processed. Purchase record already exists (duplicate)."
        }
    }
}

fn reply(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "message": message }))).into_response()
}
