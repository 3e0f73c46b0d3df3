use crate::domain::purchase::{NewPurchase, RecordOutcome};
use sqlx::PgPool;

const EXTERNAL_PAYMENT_ID_CONSTRAINT: &str = "purchases_external_payment_id_key";

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("purchase ledger unavailable: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Durable purchase store, at most one record per external payment id.
///
/// `record_purchase` must rely on the storage engine's uniqueness guarantee;
/// a uniqueness violation is the normal [`RecordOutcome::Duplicate`] result.
#[async_trait::async_trait]
pub trait PurchaseLedger: Send + Sync {
    async fn record_purchase(&self, purchase: NewPurchase) -> Result<RecordOutcome, LedgerError>;

    async fn has_purchase(&self, purchaser_id: &str, course_id: &str) -> Result<bool, LedgerError>;
}

#[derive(Clone)]
pub struct PurchasesRepo {
    pub pool: PgPool,
}

fn is_payment_id_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation()
                && db_err
                    .constraint()
                    .map_or(true, |c| c == EXTERNAL_PAYMENT_ID_CONSTRAINT)
        }
        _ => false,
    }
}

#[async_trait::async_trait]
impl PurchaseLedger for PurchasesRepo {
    async fn record_purchase(&self, purchase: NewPurchase) -> Result<RecordOutcome, LedgerError> {
        let res = sqlx::query(
            r#"
            INSERT INTO purchases (purchaser_id, course_id, external_payment_id, status, amount, currency, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, now())
            "#,
        )
        .bind(&purchase.purchaser_id)
        .bind(&purchase.course_id)
        .bind(&purchase.external_payment_id)
        .bind(&purchase.status)
        .bind(purchase.amount)
        .bind(&purchase.currency)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(RecordOutcome::Created),
            Err(e) if is_payment_id_conflict(&e) => Ok(RecordOutcome::Duplicate),
            Err(e) => Err(LedgerError::Storage(e.into())),
        }
    }

    async fn has_purchase(&self, purchaser_id: &str, course_id: &str) -> Result<bool, LedgerError> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM purchases WHERE purchaser_id = $1 AND course_id = $2)",
        )
        .bind(purchaser_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| LedgerError::Storage(e.into()))?;

        Ok(found)
    }
}
