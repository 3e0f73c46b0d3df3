use crate::domain::payment::{
    CreatedIntent, PaymentIntent, RemoteMetadata, RemotePaymentRecord, RemotePaymentStatus,
};
use crate::gateways::{GatewayError, PaymentGateway};
use reqwest::StatusCode;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

pub struct MercadoPagoGateway {
    pub base_url: String,
    pub access_token: String,
    pub timeout_ms: u64,
    pub use_sandbox_init_point: bool,
    pub client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PreferenceResponse {
    id: String,
    init_point: Option<String>,
    sandbox_init_point: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    id: serde_json::Value,
    status: RemotePaymentStatus,
    #[serde(with = "rust_decimal::serde::float")]
    transaction_amount: Decimal,
    currency_id: Option<String>,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl MercadoPagoGateway {
    fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }

    /// `{base}/v1/payments/{id}` with the id percent-encoded as one path segment.
    fn payment_url(&self, payment_id: &str) -> Result<reqwest::Url, GatewayError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| GatewayError::Network(format!("invalid gateway base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Network("gateway base url cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(["v1", "payments", payment_id]);
        Ok(url)
    }

    async fn rejected(resp: reqwest::Response) -> GatewayError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let payload = serde_json::from_str(&body)
            .unwrap_or_else(|_| serde_json::Value::String(body.chars().take(500).collect()));
        GatewayError::Rejected { status, payload }
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_decode() {
        GatewayError::InvalidResponse(e.to_string())
    } else {
        GatewayError::Network(e.to_string())
    }
}

fn metadata_value(
    metadata: &Option<serde_json::Map<String, serde_json::Value>>,
    key: &str,
) -> Option<String> {
    match metadata.as_ref()?.get(key)? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MercadoPagoGateway {
    fn name(&self) -> &'static str {
        "mercadopago"
    }

    async fn create_payment_intent(
        &self,
        intent: &PaymentIntent,
    ) -> Result<CreatedIntent, GatewayError> {
        let url = format!("{}/checkout/preferences", self.base_url);
        let items: Vec<_> = intent
            .items
            .iter()
            .map(|item| {
                json!({
                    "id": item.id,
                    "title": item.title,
                    "quantity": item.quantity,
                    "unit_price": item.unit_price.to_f64(),
                    "currency_id": item.currency_id,
                })
            })
            .collect();
        let body = json!({
            "items": items,
            "payer": { "email": intent.payer_email },
            "back_urls": intent.return_urls,
            "notification_url": intent.notification_url,
            "auto_return": "approved",
            "metadata": {
                "user_id": intent.metadata.purchaser_id,
                "course_id": intent.metadata.course_id,
            },
        });

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .header("X-Idempotency-Key", uuid::Uuid::new_v4().to_string())
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }

        let pref: PreferenceResponse = resp.json().await.map_err(transport_error)?;
        let redirect_url = if self.use_sandbox_init_point {
            pref.sandbox_init_point.or(pref.init_point)
        } else {
            pref.init_point
        }
        .ok_or_else(|| GatewayError::InvalidResponse("preference has no init_point".to_string()))?;

        Ok(CreatedIntent {
            id: pref.id,
            redirect_url,
        })
    }

    async fn fetch_payment_by_id(
        &self,
        payment_id: &str,
    ) -> Result<RemotePaymentRecord, GatewayError> {
        let url = self.payment_url(payment_id)?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(transport_error)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(payment_id.to_string()));
        }
        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }

        let payment: PaymentResponse = resp.json().await.map_err(transport_error)?;
        let external_payment_id = match &payment.id {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(GatewayError::InvalidResponse(format!(
                    "unexpected payment id {other}"
                )))
            }
        };

        Ok(RemotePaymentRecord {
            external_payment_id,
            status: payment.status,
            amount: payment.transaction_amount,
            currency: payment.currency_id,
            metadata: RemoteMetadata {
                purchaser_id: metadata_value(&payment.metadata, "user_id"),
                course_id: metadata_value(&payment.metadata, "course_id"),
            },
        })
    }
}
