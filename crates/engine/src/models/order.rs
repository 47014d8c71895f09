//! Ingested sales orders and their line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sellerglass_core::{AccountId, OrderId, OrderItemId};
use serde::Serialize;

/// An order pulled from the Orders API. One row per remote order id per
/// account; re-ingesting the same order is a no-op.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesOrder {
    pub id: OrderId,
    pub account_id: AccountId,
    pub amazon_order_id: String,
    pub marketplace_id: Option<String>,
    pub purchase_date: DateTime<Utc>,
    pub order_status: String,
    pub order_total: Option<Decimal>,
    pub currency: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A line item of an ingested order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesOrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub order_item_id: String,
    pub asin: String,
    pub seller_sku: Option<String>,
    pub title: Option<String>,
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
    pub item_total: Option<Decimal>,
    pub currency: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for an order header.
#[derive(Debug, Clone)]
pub struct NewSalesOrder {
    pub account_id: AccountId,
    pub amazon_order_id: String,
    pub marketplace_id: Option<String>,
    pub purchase_date: DateTime<Utc>,
    pub order_status: String,
    pub order_total: Option<Decimal>,
    pub currency: Option<String>,
}

/// Insert payload for a line item.
#[derive(Debug, Clone)]
pub struct NewSalesOrderItem {
    pub order_item_id: String,
    pub asin: String,
    pub seller_sku: Option<String>,
    pub title: Option<String>,
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
    pub item_total: Option<Decimal>,
    pub currency: Option<String>,
}
