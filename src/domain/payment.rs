use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Reconciliation key carried through the gateway and read back on the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentMetadata {
    pub purchaser_id: String,
    pub course_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub currency_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

/// Payment request submitted once to the gateway; never persisted locally.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    pub course_id: String,
    pub purchaser_id: String,
    pub payer_email: String,
    pub amount: Decimal,
    pub currency: String,
    pub items: Vec<LineItem>,
    pub return_urls: ReturnUrls,
    pub notification_url: String,
    pub metadata: IntentMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIntent {
    pub id: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemotePaymentStatus {
    Pending,
    Approved,
    Authorized,
    InProcess,
    InMediation,
    Rejected,
    Cancelled,
    Refunded,
    ChargedBack,
    #[serde(other)]
    Unknown,
}

impl RemotePaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemotePaymentStatus::Pending => "pending",
            RemotePaymentStatus::Approved => "approved",
            RemotePaymentStatus::Authorized => "authorized",
            RemotePaymentStatus::InProcess => "in_process",
            RemotePaymentStatus::InMediation => "in_mediation",
            RemotePaymentStatus::Rejected => "rejected",
            RemotePaymentStatus::Cancelled => "cancelled",
            RemotePaymentStatus::Refunded => "refunded",
            RemotePaymentStatus::ChargedBack => "charged_back",
            RemotePaymentStatus::Unknown => "unknown",
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, RemotePaymentStatus::Approved)
    }
}

/// Metadata as read back from the gateway. Either key may have been lost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteMetadata {
    pub purchaser_id: Option<String>,
    pub course_id: Option<String>,
}

/// Authoritative payment state fetched from the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePaymentRecord {
    pub external_payment_id: String,
    pub status: RemotePaymentStatus,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub metadata: RemoteMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationData {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
}

/// Webhook body. Only `type` and `data.id` drive reconciliation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentNotification {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub data: Option<NotificationData>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub live_mode: Option<bool>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
}

impl PaymentNotification {
    pub fn payment(payment_id: &str) -> Self {
        Self {
            event_type: Some("payment".to_string()),
            data: Some(NotificationData {
                id: Some(payment_id.to_string()),
            }),
            ..Default::default()
        }
    }

    /// The payment id this notification points at, if it is a payment event.
    ///
    /// Processor payment ids are numeric; anything else is treated as absent
    /// so it never reaches a gateway URL.
    pub fn payment_id(&self) -> Option<&str> {
        if self.event_type.as_deref() != Some("payment") {
            return None;
        }
        self.data
            .as_ref()
            .and_then(|d| d.id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Body of the create-preference endpoint. `courseId` is kept raw so a
/// wrongly typed value is reported as a field error, not a parse error.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePreferenceRequest {
    #[serde(rename = "courseId", default)]
    pub course_id: Option<serde_json::Value>,
}

impl CreatePreferenceRequest {
    pub fn course_id(&self) -> Option<&str> {
        self.course_id.as_ref().and_then(serde_json::Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreferenceResponse {
    pub preference_id: String,
    pub redirect_url: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}
