use rust_decimal::Decimal;

/// A purchase about to be written to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPurchase {
    pub purchaser_id: String,
    pub course_id: String,
    pub external_payment_id: String,
    pub status: String,
    pub amount: Decimal,
    pub currency: Option<String>,
}

/// Result of a conditional insert keyed by external payment id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Created,
    Duplicate,
}
