//! Classified financial ledger lines.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sellerglass_core::{AccountId, FinancialEventType, TransactionId};
use serde::Serialize;

/// One ledger line derived from a remote financial event.
///
/// `gross_amount` is revenue (Principal charges), `fee_amount` the absolute
/// fee burden, `net_amount` the signed sum of everything. The untouched wire
/// event is kept in `raw_event` for audit.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FinancialTransaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub amazon_order_id: Option<String>,
    pub event_type: FinancialEventType,
    pub description: String,
    pub gross_amount: Decimal,
    pub fee_amount: Decimal,
    pub net_amount: Decimal,
    pub currency: String,
    pub posted_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub dedup_key: String,
    pub raw_event: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a ledger line.
#[derive(Debug, Clone)]
pub struct NewFinancialTransaction {
    pub account_id: AccountId,
    pub amazon_order_id: Option<String>,
    pub event_type: FinancialEventType,
    pub description: String,
    pub gross_amount: Decimal,
    pub fee_amount: Decimal,
    pub net_amount: Decimal,
    pub currency: String,
    pub posted_at: DateTime<Utc>,
    pub dedup_key: String,
    pub raw_event: serde_json::Value,
}
