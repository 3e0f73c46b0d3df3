use crate::http::handlers::{access, ops, payments, webhooks};
use crate::http::middleware::rate_limit::{self, RateLimitState};
use crate::http::middleware::{session_auth, webhook_origin};
use crate::AppState;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

pub fn build_router(state: AppState, intent_rate_limit: Option<RateLimitState>) -> Router {
    let create_preference = match intent_rate_limit {
        Some(limit) => post(payments::create_preference)
            .layer(from_fn_with_state(limit, rate_limit::enforce)),
        None => post(payments::create_preference),
    };

    let session_routes = Router::new()
        .route("/api/payment/create-preference", create_preference)
        .route("/api/courses/:course_id/access", get(access::get_course_access))
        .route_layer(from_fn_with_state(
            state.sessions.clone(),
            session_auth::require_session,
        ));

    let webhook_routes = Router::new()
        .route("/api/payment/webhook", post(webhooks::payment_webhook))
        .route_layer(from_fn_with_state(
            state.webhook_authenticator.clone(),
            webhook_origin::require_processor_origin,
        ));

    Router::new()
        .route("/health", get(payments::health))
        .route("/ops/readiness", get(ops::readiness))
        .route("/ops/liveness", get(ops::liveness))
        .merge(session_routes)
        .merge(webhook_routes)
        .with_state(state)
}
