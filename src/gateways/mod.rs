use crate::domain::payment::{CreatedIntent, PaymentIntent, RemotePaymentRecord};

pub mod mercadopago;
pub mod mock;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway rejected request with HTTP {status}")]
    Rejected {
        status: u16,
        payload: serde_json::Value,
    },

    #[error("payment {0} not found at gateway")]
    NotFound(String),

    #[error("gateway timeout")]
    Timeout,

    #[error("gateway network error: {0}")]
    Network(String),

    #[error("gateway returned an unreadable response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Structured diagnostic to surface to callers alongside the message.
    pub fn diagnostic(&self) -> serde_json::Value {
        match self {
            GatewayError::Rejected { status, payload } => serde_json::json!({
                "gateway_status": status,
                "gateway_response": payload,
            }),
            GatewayError::NotFound(id) => serde_json::json!({"payment_id": id}),
            GatewayError::Timeout => serde_json::json!({"reason": "timeout"}),
            GatewayError::Network(e) | GatewayError::InvalidResponse(e) => {
                serde_json::json!({"reason": e})
            }
        }
    }
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_payment_intent(
        &self,
        intent: &PaymentIntent,
    ) -> Result<CreatedIntent, GatewayError>;

    async fn fetch_payment_by_id(
        &self,
        payment_id: &str,
    ) -> Result<RemotePaymentRecord, GatewayError>;
}
