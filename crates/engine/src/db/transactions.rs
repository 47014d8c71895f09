//! Database operations for the classified financial ledger.

use sqlx::PgPool;

use sellerglass_core::AccountId;

use super::RepositoryError;
use crate::models::transaction::{FinancialTransaction, NewFinancialTransaction};

/// Insert a ledger line unless the same event was ingested before.
///
/// `(account_id, dedup_key)` is the idempotency key; the dedup key is a
/// content hash of the event's identifying fields, so re-ingesting an
/// overlapping posted-after window writes nothing for events already present.
///
/// # Returns
///
/// `true` if the row was inserted, `false` if it was already there.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_transaction(
    pool: &PgPool,
    input: &NewFinancialTransaction,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        INSERT INTO financial_transactions (
            account_id, amazon_order_id, event_type, description,
            gross_amount, fee_amount, net_amount, currency,
            posted_at, dedup_key, raw_event
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (account_id, dedup_key) DO NOTHING
        ",
    )
    .bind(input.account_id)
    .bind(&input.amazon_order_id)
    .bind(input.event_type)
    .bind(&input.description)
    .bind(input.gross_amount)
    .bind(input.fee_amount)
    .bind(input.net_amount)
    .bind(&input.currency)
    .bind(input.posted_at)
    .bind(&input.dedup_key)
    .bind(&input.raw_event)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Ledger lines recorded for an account, most recently posted first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_transactions_by_account(
    pool: &PgPool,
    account_id: AccountId,
) -> Result<Vec<FinancialTransaction>, RepositoryError> {
    let transactions = sqlx::query_as::<_, FinancialTransaction>(
        r"
        SELECT
            id, account_id, amazon_order_id, event_type, description,
            gross_amount, fee_amount, net_amount, currency,
            posted_at, dedup_key, raw_event, created_at
        FROM financial_transactions
        WHERE account_id = $1
        ORDER BY posted_at DESC
        ",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(transactions)
}
