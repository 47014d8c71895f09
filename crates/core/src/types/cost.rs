//! Cost component breakdown for product cost versions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-unit cost breakdown of a product at a point in time.
///
/// All amounts are in the account owner's bookkeeping currency and use
/// decimal arithmetic throughout; none of these values ever pass through a
/// binary float. On the wire each amount is a decimal string, and only a
/// string: a bare JSON number is rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CostComponents {
    /// Purchase or manufacturing cost.
    #[serde(with = "rust_decimal::serde::str")]
    pub base_cost: Decimal,
    /// Inbound freight to the fulfillment center.
    #[serde(with = "rust_decimal::serde::str")]
    pub shipping_cost: Decimal,
    /// Import duties and customs clearance.
    #[serde(with = "rust_decimal::serde::str")]
    pub customs_cost: Decimal,
    /// Warehousing attributed per unit.
    #[serde(with = "rust_decimal::serde::str")]
    pub storage_cost: Decimal,
    /// Packaging and labeling.
    #[serde(with = "rust_decimal::serde::str")]
    pub packaging_cost: Decimal,
}

impl CostComponents {
    /// Sum of all components; the landed unit cost.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.base_cost
            + self.shipping_cost
            + self.customs_cost
            + self.storage_cost
            + self.packaging_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_sums_every_component() {
        let components = CostComponents {
            base_cost: Decimal::new(1050, 2),
            shipping_cost: Decimal::new(125, 2),
            customs_cost: Decimal::new(80, 2),
            storage_cost: Decimal::new(30, 2),
            packaging_cost: Decimal::new(15, 2),
        };
        assert_eq!(components.total(), Decimal::new(1300, 2));
    }

    #[test]
    fn default_components_total_zero() {
        assert_eq!(CostComponents::default().total(), Decimal::ZERO);
    }
}
