//! Database operations for the append-only cost version ledger.
//!
//! Versions partition time per product into `[effective_from, effective_to)`
//! windows; the single open window has `effective_to = NULL`. Appending a
//! version closes the open one at the new start, inside one transaction that
//! locks the open row, so two concurrent appends for the same product cannot
//! interleave.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sellerglass_core::{CostVersionId, ProductId};

use super::RepositoryError;
use crate::models::cost::{CostVersion, NewCostVersion};

/// The open version's identity, start and number, as locked for append.
#[derive(sqlx::FromRow)]
struct OpenVersionRow {
    id: CostVersionId,
    effective_from: DateTime<Utc>,
    version: i32,
}

/// Whether a new version may start at `candidate` given the open version's
/// start.
///
/// Starting at the same instant is allowed (the closed version collapses to
/// an empty window); starting earlier would rewrite already-closed history
/// and is rejected.
fn effective_from_accepted(open_started: Option<DateTime<Utc>>, candidate: DateTime<Utc>) -> bool {
    open_started.is_none_or(|started| candidate >= started)
}

/// Append a cost version, closing the currently open one.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product doesn't exist and
/// `RepositoryError::Conflict` if the new version would start before the
/// open version does.
pub async fn create_cost_version(
    pool: &PgPool,
    product_id: ProductId,
    input: &NewCostVersion,
) -> Result<CostVersion, RepositoryError> {
    let effective_from = input.effective_from.unwrap_or_else(Utc::now);

    let mut tx = pool.begin().await?;

    let open = sqlx::query_as::<_, OpenVersionRow>(
        r"
        SELECT id, effective_from, version
        FROM cost_versions
        WHERE product_id = $1 AND effective_to IS NULL
        FOR UPDATE
        ",
    )
    .bind(product_id)
    .fetch_optional(&mut *tx)
    .await?;

    if !effective_from_accepted(open.as_ref().map(|o| o.effective_from), effective_from) {
        return Err(RepositoryError::Conflict(format!(
            "cost version cannot start before the open version ({})",
            open.map(|o| o.effective_from.to_rfc3339()).unwrap_or_default()
        )));
    }

    let version = match &open {
        Some(open) => {
            sqlx::query(
                r"
                UPDATE cost_versions
                SET effective_to = $2
                WHERE id = $1
                ",
            )
            .bind(open.id)
            .bind(effective_from)
            .execute(&mut *tx)
            .await?;

            open.version + 1
        }
        // Append-only history: a product without an open version has no
        // versions at all
        None => 1,
    };

    let created = sqlx::query_as::<_, CostVersion>(
        r"
        INSERT INTO cost_versions (
            product_id, version, effective_from,
            base_cost, shipping_cost, customs_cost, storage_cost, packaging_cost,
            total_cost, created_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING
            id, product_id, version, effective_from, effective_to,
            base_cost, shipping_cost, customs_cost, storage_cost, packaging_cost,
            total_cost, created_by, created_at
        ",
    )
    .bind(product_id)
    .bind(version)
    .bind(effective_from)
    .bind(input.components.base_cost)
    .bind(input.components.shipping_cost)
    .bind(input.components.customs_cost)
    .bind(input.components.storage_cost)
    .bind(input.components.packaging_cost)
    .bind(input.components.total())
    .bind(input.created_by)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            match db_err.constraint() {
                Some("cost_versions_product_id_fkey") => return RepositoryError::NotFound,
                Some("cost_versions_one_open_per_product" | "cost_versions_product_version_key") => {
                    return RepositoryError::Conflict(
                        "concurrent cost version append detected".to_string(),
                    );
                }
                _ => {}
            }
        }
        RepositoryError::Database(e)
    })?;

    tx.commit().await?;

    Ok(created)
}

/// Resolve the cost that was in effect at `as_of`.
///
/// A version matches when `effective_from <= as_of` and the window is still
/// open or ends at/after `as_of`; the most recent match wins. Historical
/// margins stay stable because closed windows are never rewritten.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn current_cost_version(
    pool: &PgPool,
    product_id: ProductId,
    as_of: DateTime<Utc>,
) -> Result<Option<CostVersion>, RepositoryError> {
    let version = sqlx::query_as::<_, CostVersion>(
        r"
        SELECT
            id, product_id, version, effective_from, effective_to,
            base_cost, shipping_cost, customs_cost, storage_cost, packaging_cost,
            total_cost, created_by, created_at
        FROM cost_versions
        WHERE product_id = $1
          AND effective_from <= $2
          AND (effective_to IS NULL OR effective_to >= $2)
        ORDER BY effective_from DESC, version DESC
        LIMIT 1
        ",
    )
    .bind(product_id)
    .bind(as_of)
    .fetch_optional(pool)
    .await?;

    Ok(version)
}

/// Full version history for a product, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_cost_versions(
    pool: &PgPool,
    product_id: ProductId,
) -> Result<Vec<CostVersion>, RepositoryError> {
    let versions = sqlx::query_as::<_, CostVersion>(
        r"
        SELECT
            id, product_id, version, effective_from, effective_to,
            base_cost, shipping_cost, customs_cost, storage_cost, packaging_cost,
            total_cost, created_by, created_at
        FROM cost_versions
        WHERE product_id = $1
        ORDER BY version DESC
        ",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(versions)
}
