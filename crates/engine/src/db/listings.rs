//! Database operations for marketplace listings.

use sqlx::PgPool;

use sellerglass_core::AccountId;

use super::RepositoryError;
use crate::models::listing::{Listing, ListingUpsert};

/// Upsert a listing on its natural key (account, seller SKU).
///
/// ASIN can repeat across variations, so the seller's own SKU is the match
/// key. Re-syncing refreshes status, quantity, price and the sync timestamp
/// in place.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn upsert_listing(
    pool: &PgPool,
    input: &ListingUpsert,
) -> Result<Listing, RepositoryError> {
    let listing = sqlx::query_as::<_, Listing>(
        r"
        INSERT INTO listings (
            product_id, account_id, asin, seller_sku, status, quantity, price
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (account_id, seller_sku) DO UPDATE
        SET
            product_id = EXCLUDED.product_id,
            asin = EXCLUDED.asin,
            status = EXCLUDED.status,
            quantity = EXCLUDED.quantity,
            price = EXCLUDED.price,
            last_synced_at = NOW()
        RETURNING
            id, product_id, account_id, asin, seller_sku, status,
            quantity, price, last_synced_at, created_at
        ",
    )
    .bind(input.product_id)
    .bind(input.account_id)
    .bind(&input.asin)
    .bind(&input.seller_sku)
    .bind(&input.status)
    .bind(input.quantity)
    .bind(input.price)
    .fetch_one(pool)
    .await?;

    Ok(listing)
}

/// List the listings attached to an account, most recently synced first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_listings_by_account(
    pool: &PgPool,
    account_id: AccountId,
) -> Result<Vec<Listing>, RepositoryError> {
    let listings = sqlx::query_as::<_, Listing>(
        r"
        SELECT
            id, product_id, account_id, asin, seller_sku, status,
            quantity, price, last_synced_at, created_at
        FROM listings
        WHERE account_id = $1
        ORDER BY last_synced_at DESC
        ",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(listings)
}
