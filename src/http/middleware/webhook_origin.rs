use crate::service::webhook_auth::WebhookAuthenticator;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn require_processor_origin(
    State(authenticator): State<WebhookAuthenticator>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !authenticator.is_authentic(request.headers()) {
        return (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"message": "Unauthorized webhook request."})),
        )
            .into_response();
    }

    next.run(request).await
}
