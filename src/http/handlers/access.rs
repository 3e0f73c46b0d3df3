use crate::http::middleware::session_auth::AuthenticatedUser;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use uuid::Uuid;

pub async fn get_course_access(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Path(course_id): Path<Uuid>,
) -> impl IntoResponse {
    match state
        .ledger
        .has_purchase(&user_id.to_string(), &course_id.to_string())
        .await
    {
        Ok(purchased) => (
            StatusCode::OK,
            Json(serde_json::json!({"courseId": course_id, "purchased": purchased})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(%course_id, %user_id, error = %e, "purchase lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"message": e.to_string()})),
            )
                .into_response()
        }
    }
}
