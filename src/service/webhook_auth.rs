use axum::http::{header, HeaderMap};

/// Coarse origin filter for processor webhooks.
///
/// A request passes when it carries an `x-request-id` header and a
/// `User-Agent` containing the processor's marker (case-insensitive).
/// Both headers are trivially forgeable; this is not signature verification.
#[derive(Clone, Debug)]
pub struct WebhookAuthenticator {
    pub user_agent_marker: String,
}

impl WebhookAuthenticator {
    pub fn new(user_agent_marker: &str) -> Self {
        Self {
            user_agent_marker: user_agent_marker.to_lowercase(),
        }
    }

    pub fn is_authentic(&self, headers: &HeaderMap) -> bool {
        let request_id = header_str(headers, "x-request-id");
        let user_agent = header_str(headers, header::USER_AGENT.as_str());

        match (request_id, user_agent) {
            (Some(_), Some(ua)) if ua.to_lowercase().contains(&self.user_agent_marker) => true,
            _ => {
                tracing::warn!(
                    request_id = request_id.unwrap_or("-"),
                    user_agent = user_agent.unwrap_or("-"),
                    "webhook failed origin check"
                );
                false
            }
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
