//! Listing: one product as offered on one marketplace account.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sellerglass_core::{AccountId, ListingId, ProductId};
use serde::Serialize;

/// The remote view of a product on one account. At most one listing exists
/// per (account, seller SKU) pair; reconciliation upserts on that key.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Listing {
    pub id: ListingId,
    pub product_id: ProductId,
    pub account_id: AccountId,
    pub asin: String,
    pub seller_sku: String,
    pub status: String,
    pub quantity: i32,
    pub price: Option<Decimal>,
    pub last_synced_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Upsert payload produced by the catalog reconciler.
#[derive(Debug, Clone)]
pub struct ListingUpsert {
    pub product_id: ProductId,
    pub account_id: AccountId,
    pub asin: String,
    pub seller_sku: String,
    pub status: String,
    pub quantity: i32,
    pub price: Option<Decimal>,
}
