use crate::domain::payment::{
    CreatePreferenceRequest, CreatePreferenceResponse, ErrorEnvelope, ErrorPayload,
};
use crate::http::middleware::session_auth::AuthenticatedUser;
use crate::service::preference_builder::PurchaseIntentError;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use std::collections::BTreeMap;
use uuid::Uuid;

pub async fn create_preference(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(purchaser_id)): Extension<AuthenticatedUser>,
    body: Bytes,
) -> Response {
    let req: CreatePreferenceRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::debug!(error = %e, "unparseable create-preference body");
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid request body: Could not parse JSON.",
                None,
                None,
            );
        }
    };

    let course_id = match req.course_id().map(Uuid::parse_str) {
        Some(Ok(id)) => id,
        _ => {
            let mut errors = BTreeMap::new();
            errors.insert(
                "courseId".to_string(),
                vec!["Invalid Course ID format.".to_string()],
            );
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid request data.",
                None,
                Some(errors),
            );
        }
    };

    match state
        .preference_builder
        .create_purchase_intent(course_id, purchaser_id)
        .await
    {
        Ok(intent) => (
            StatusCode::OK,
            Json(CreatePreferenceResponse {
                preference_id: intent.preference_id,
                redirect_url: intent.redirect_url,
                message: "Payment preference created successfully.".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            if matches!(e, PurchaseIntentError::Lookup(_)) {
                tracing::error!(%course_id, %purchaser_id, error = %e, "purchase intent lookup failed");
            }
            let message = match &e {
                PurchaseIntentError::Lookup(_) => "An unexpected error occurred on the server.".to_string(),
                other => other.to_string(),
            };
            error_response(
                intent_error_status(&e),
                &message,
                Some(ErrorPayload {
                    code: e.code().to_string(),
                    message: message.clone(),
                    details: e.details(),
                }),
                None,
            )
        }
    }
}

pub fn intent_error_status(e: &PurchaseIntentError) -> StatusCode {
    match e {
        PurchaseIntentError::CourseUnavailable(_) => StatusCode::BAD_REQUEST,
        PurchaseIntentError::CourseNotFound(_)
        | PurchaseIntentError::PurchaserContactUnresolved(_) => StatusCode::NOT_FOUND,
        PurchaseIntentError::Gateway(_) | PurchaseIntentError::Lookup(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

fn error_response(
    status: StatusCode,
    message: &str,
    error: Option<ErrorPayload>,
    errors: Option<BTreeMap<String, Vec<String>>>,
) -> Response {
    (
        status,
        Json(ErrorEnvelope {
            message: message.to_string(),
            error,
            errors,
        }),
    )
        .into_response()
}
