//! Versioned cost records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sellerglass_core::{CostComponents, CostVersionId, OwnerId, ProductId};
use serde::{Deserialize, Serialize};

/// One time-ranged cost record for a product.
///
/// Versions partition time: `[effective_from, effective_to)`, with the open
/// version carrying `effective_to = NULL`. Records are append-only; closing a
/// version only ever sets its `effective_to`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CostVersion {
    pub id: CostVersionId,
    pub product_id: ProductId,
    pub version: i32,
    pub effective_from: DateTime<Utc>,
    pub effective_to: Option<DateTime<Utc>>,
    pub base_cost: Decimal,
    pub shipping_cost: Decimal,
    pub customs_cost: Decimal,
    pub storage_cost: Decimal,
    pub packaging_cost: Decimal,
    pub total_cost: Decimal,
    pub created_by: Option<OwnerId>,
    pub created_at: DateTime<Utc>,
}

impl CostVersion {
    /// The component breakdown of this version.
    #[must_use]
    pub const fn components(&self) -> CostComponents {
        CostComponents {
            base_cost: self.base_cost,
            shipping_cost: self.shipping_cost,
            customs_cost: self.customs_cost,
            storage_cost: self.storage_cost,
            packaging_cost: self.packaging_cost,
        }
    }

    /// Whether this version is the open one.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.effective_to.is_none()
    }
}

/// Input for appending a cost version to a product's ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCostVersion {
    #[serde(flatten)]
    pub components: CostComponents,
    /// When the new cost takes effect; defaults to now.
    #[serde(default)]
    pub effective_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<OwnerId>,
}
