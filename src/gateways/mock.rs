use crate::domain::payment::{CreatedIntent, PaymentIntent, RemotePaymentRecord};
use crate::gateways::{GatewayError, PaymentGateway};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-process gateway for local development and tests.
///
/// Payments are only known once seeded with [`MockGateway::seed_payment`];
/// anything else is reported as not found.
#[derive(Default)]
pub struct MockGateway {
    pub checkout_base_url: String,
    pub behavior: MockBehavior,
    intents: Mutex<Vec<PaymentIntent>>,
    payments: Mutex<HashMap<String, RemotePaymentRecord>>,
    fetches: AtomicUsize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MockBehavior {
    #[default]
    AlwaysSuccess,
    AlwaysReject,
    AlwaysTimeout,
}

impl MockGateway {
    pub fn new(checkout_base_url: &str) -> Self {
        Self {
            checkout_base_url: checkout_base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn seed_payment(&self, record: RemotePaymentRecord) {
        if let Ok(mut payments) = self.payments.lock() {
            payments.insert(record.external_payment_id.clone(), record);
        }
    }

    pub fn submitted_intents(&self) -> Vec<PaymentIntent> {
        self.intents.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn failure(&self) -> Option<GatewayError> {
        match self.behavior {
            MockBehavior::AlwaysSuccess => None,
            MockBehavior::AlwaysReject => Some(GatewayError::Rejected {
                status: 400,
                payload: serde_json::json!({"message": "mock decline", "error": "bad_request"}),
            }),
            MockBehavior::AlwaysTimeout => Some(GatewayError::Timeout),
        }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_payment_intent(
        &self,
        intent: &PaymentIntent,
    ) -> Result<CreatedIntent, GatewayError> {
        if let Some(err) = self.failure() {
            return Err(err);
        }

        let mut intents = self
            .intents
            .lock()
            .map_err(|_| GatewayError::Network("mock gateway poisoned".to_string()))?;
        intents.push(intent.clone());
        let id = format!("pref_{}", intents.len());

        Ok(CreatedIntent {
            redirect_url: format!("{}/{}", self.checkout_base_url, id),
            id,
        })
    }

    async fn fetch_payment_by_id(
        &self,
        payment_id: &str,
    ) -> Result<RemotePaymentRecord, GatewayError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure() {
            return Err(err);
        }

        self.payments
            .lock()
            .map_err(|_| GatewayError::Network("mock gateway poisoned".to_string()))?
            .get(payment_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(payment_id.to_string()))
    }
}
