use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use redis::AsyncCommands;

#[derive(Clone)]
pub struct RateLimitState {
    pub redis_client: redis::Client,
    pub max_per_minute: i64,
}

/// Fixed one-minute window per client IP. Fails open when Redis is unreachable.
pub async fn enforce(
    State(state): State<RateLimitState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&request);
    let key = format!(
        "rate:intent:{}:{}",
        ip,
        chrono::Utc::now().format("%Y%m%d%H%M")
    );

    let count = window_count(&state.redis_client, &key).await;
    if exceeds_limit(count, state.max_per_minute) {
        tracing::warn!(%ip, count, "purchase intent rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({"message": "Too many purchase attempts. Try again shortly."})),
        )
            .into_response();
    }

    next.run(request).await
}

/// Requests seen in the current window, or `None` when Redis is unreachable.
async fn window_count(client: &redis::Client, key: &str) -> Option<i64> {
    let mut conn = client.get_multiplexed_async_connection().await.ok()?;
    let count: i64 = conn.incr(key, 1).await.ok()?;
    let _: bool = conn.expire(key, 120).await.unwrap_or(false);
    Some(count)
}

fn exceeds_limit(count: Option<i64>, max_per_minute: i64) -> bool {
    count.is_some_and(|c| c > max_per_minute)
}

fn client_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
