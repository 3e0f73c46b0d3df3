//! Webhook reconciliation.
//!
//! A notification is only a hint that something changed for a payment id.
//! Every payment notification re-fetches the payment from the gateway and acts
//! on that state, so replaying the same or a later notification converges on
//! the same ledger contents. The ledger's uniqueness key on the external
//! payment id is what makes concurrent deliveries record at most once.

use crate::domain::payment::{PaymentNotification, RemotePaymentRecord, RemotePaymentStatus};
use crate::domain::purchase::{NewPurchase, RecordOutcome};
use crate::gateways::{GatewayError, PaymentGateway};
use crate::repo::purchases_repo::{LedgerError, PurchaseLedger};
use std::sync::Arc;

/// Terminal states that acknowledge the delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Not a payment event, or no payment id to look up.
    Filtered,
    /// Payment exists but is not approved; nothing recorded.
    Ignored { status: RemotePaymentStatus },
    Recorded { external_payment_id: String },
    AlreadyRecorded { external_payment_id: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("failed to fetch payment {payment_id}: {source}")]
    FetchFailed {
        payment_id: String,
        #[source]
        source: GatewayError,
    },

    #[error("payment {payment_id} not found at gateway")]
    PaymentNotFound { payment_id: String },

    #[error("payment {payment_id} approved but metadata is missing {missing:?}")]
    MetadataMissing {
        payment_id: String,
        missing: Vec<&'static str>,
    },

    #[error("payment {payment_id} approved but purchase could not be saved: {source}")]
    Storage {
        payment_id: String,
        #[source]
        source: LedgerError,
    },
}

impl ReconcileError {
    /// Whether the processor should redeliver the notification.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReconcileError::FetchFailed { .. } | ReconcileError::Storage { .. } => true,
            ReconcileError::PaymentNotFound { .. } | ReconcileError::MetadataMissing { .. } => {
                false
            }
        }
    }
}

#[derive(Clone)]
pub struct WebhookReconciler {
    pub gateway: Arc<dyn PaymentGateway>,
    pub ledger: Arc<dyn PurchaseLedger>,
}

impl WebhookReconciler {
    pub async fn reconcile(
        &self,
        notification: &PaymentNotification,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let Some(payment_id) = notification.payment_id() else {
            tracing::info!(
                event_type = notification.event_type.as_deref().unwrap_or("-"),
                action = notification.action.as_deref().unwrap_or("-"),
                "webhook not applicable, skipping"
            );
            return Ok(ReconcileOutcome::Filtered);
        };

        let payment = self
            .gateway
            .fetch_payment_by_id(payment_id)
            .await
            .map_err(|source| match source {
                GatewayError::NotFound(_) => {
                    tracing::warn!(
                        payment_id,
                        gateway = self.gateway.name(),
                        "notified payment does not exist at gateway"
                    );
                    ReconcileError::PaymentNotFound {
                        payment_id: payment_id.to_string(),
                    }
                }
                source => {
                    tracing::error!(
                        payment_id,
                        gateway = self.gateway.name(),
                        error = %source,
                        "failed to fetch payment from gateway"
                    );
                    ReconcileError::FetchFailed {
                        payment_id: payment_id.to_string(),
                        source,
                    }
                }
            })?;

        if !payment.status.is_approved() {
            tracing::info!(
                payment_id,
                status = payment.status.as_str(),
                "payment not approved, no purchase recorded"
            );
            return Ok(ReconcileOutcome::Ignored {
                status: payment.status,
            });
        }

        let purchase = approved_purchase(payment_id, payment)?;
        let external_payment_id = purchase.external_payment_id.clone();
        let (purchaser_id, course_id) = (purchase.purchaser_id.clone(), purchase.course_id.clone());

        let outcome = self
            .ledger
            .record_purchase(purchase)
            .await
            .map_err(|source| {
                tracing::error!(
                    payment_id = %external_payment_id,
                    error = %source,
                    "payment approved but purchase could not be saved"
                );
                ReconcileError::Storage {
                    payment_id: external_payment_id.clone(),
                    source,
                }
            })?;

        match outcome {
            RecordOutcome::Created => {
                tracing::info!(
                    payment_id = %external_payment_id,
                    %purchaser_id,
                    %course_id,
                    "purchase recorded"
                );
                Ok(ReconcileOutcome::Recorded {
                    external_payment_id,
                })
            }
            RecordOutcome::Duplicate => {
                tracing::info!(payment_id = %external_payment_id, "purchase already recorded");
                Ok(ReconcileOutcome::AlreadyRecorded {
                    external_payment_id,
                })
            }
        }
    }
}

fn approved_purchase(
    notified_id: &str,
    payment: RemotePaymentRecord,
) -> Result<NewPurchase, ReconcileError> {
    let mut missing = Vec::new();
    if payment.metadata.purchaser_id.is_none() {
        missing.push("purchaser_id");
    }
    if payment.metadata.course_id.is_none() {
        missing.push("course_id");
    }

    match (payment.metadata.purchaser_id, payment.metadata.course_id) {
        (Some(purchaser_id), Some(course_id)) => Ok(NewPurchase {
            purchaser_id,
            course_id,
            external_payment_id: payment.external_payment_id,
            status: payment.status.as_str().to_string(),
            amount: payment.amount,
            currency: payment.currency,
        }),
        _ => {
            tracing::error!(
                error_kind = "DataIntegrityError",
                payment_id = notified_id,
                missing = ?missing,
                "approved payment is missing reconciliation metadata; manual reconciliation required"
            );
            Err(ReconcileError::MetadataMissing {
                payment_id: notified_id.to_string(),
                missing,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::RemoteMetadata;
    use rust_decimal::Decimal;

    fn approved(metadata: RemoteMetadata) -> RemotePaymentRecord {
        RemotePaymentRecord {
            external_payment_id: "777".to_string(),
            status: RemotePaymentStatus::Approved,
            amount: Decimal::new(4999, 2),
            currency: Some("ARS".to_string()),
            metadata,
        }
    }

    #[test]
    fn approved_payment_maps_to_purchase() {
        let p = approved_purchase(
            "777",
            approved(RemoteMetadata {
                purchaser_id: Some("u1".to_string()),
                course_id: Some("c1".to_string()),
            }),
        )
        .unwrap();
        assert_eq!(p.purchaser_id, "u1");
        assert_eq!(p.course_id, "c1");
        assert_eq!(p.external_payment_id, "777");
        assert_eq!(p.status, "approved");
        assert_eq!(p.amount, Decimal::new(4999, 2));
    }

    #[test]
    fn reports_every_missing_key() {
        let err = approved_purchase("777", approved(RemoteMetadata::default())).unwrap_err();
        match err {
            ReconcileError::MetadataMissing { missing, .. } => {
                assert_eq!(missing, vec!["purchaser_id", "course_id"])
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn metadata_missing_is_not_retryable() {
        let err = ReconcileError::MetadataMissing {
            payment_id: "1".to_string(),
            missing: vec!["course_id"],
        };
        assert!(!err.is_retryable());
        let err = ReconcileError::PaymentNotFound {
            payment_id: "1".to_string(),
        };
        assert!(!err.is_retryable());
        let err = ReconcileError::FetchFailed {
            payment_id: "1".to_string(),
            source: GatewayError::Timeout,
        };
        assert!(err.is_retryable());
    }
}
