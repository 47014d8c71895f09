//! Internal catalog entry.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sellerglass_core::{OwnerId, ProductId};
use serde::{Deserialize, Serialize};

/// An owner's catalog product. The marketplace-facing `sku` is the match key
/// during catalog reconciliation and is unique per owner.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub owner_id: OwnerId,
    pub internal_sku: Option<String>,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub weight_g: Option<Decimal>,
    pub length_cm: Option<Decimal>,
    pub width_cm: Option<Decimal>,
    pub height_cm: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product, either by hand or by the reconciler when it
/// discovers an unknown remote SKU.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub owner_id: OwnerId,
    #[serde(default)]
    pub internal_sku: Option<String>,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub weight_g: Option<Decimal>,
    #[serde(default)]
    pub length_cm: Option<Decimal>,
    #[serde(default)]
    pub width_cm: Option<Decimal>,
    #[serde(default)]
    pub height_cm: Option<Decimal>,
}
