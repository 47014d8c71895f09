//! Wire types for SP-API responses.
//!
//! Field naming follows the upstream JSON exactly: the Sellers, FBA Inventory
//! and Catalog APIs use camelCase, while the older Orders and Finances v0
//! APIs use PascalCase (with a few irregular names like `ASIN` and
//! `SellerSKU`). Monetary amounts are deserialized straight into
//! [`Decimal`]; the Orders API sends them as decimal strings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Sellers API (getMarketplaceParticipations)
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct MarketplaceParticipationsResponse {
    #[serde(default)]
    pub payload: Vec<MarketplaceParticipation>,
}

/// One marketplace the seller participates in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceParticipation {
    pub marketplace: MarketplaceInfo,
    pub participation: Participation,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceInfo {
    pub id: String,
    pub name: String,
    pub country_code: String,
    #[serde(default)]
    pub default_currency_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub is_participating: bool,
    #[serde(default)]
    pub has_suspended_listings: bool,
}

// =============================================================================
// FBA Inventory API (getInventorySummaries)
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct InventorySummariesResponse {
    pub payload: InventorySummariesPayload,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct InventorySummariesPayload {
    pub inventory_summaries: Vec<InventorySummary>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Pagination {
    pub next_token: Option<String>,
}

/// One FBA inventory position, keyed by seller SKU.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventorySummary {
    pub asin: Option<String>,
    pub fn_sku: Option<String>,
    pub seller_sku: Option<String>,
    pub condition: Option<String>,
    pub product_name: Option<String>,
    pub total_quantity: Option<i32>,
}

/// One page of inventory summaries.
#[derive(Debug)]
pub struct InventorySummariesPage {
    pub summaries: Vec<InventorySummary>,
    pub next_token: Option<String>,
}

// =============================================================================
// Catalog Items API (getCatalogItem, 2022-04-01)
// =============================================================================

/// Catalog item detail, used to enrich auto-created products.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub asin: String,
    #[serde(default)]
    pub summaries: Vec<ItemSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemSummary {
    pub marketplace_id: Option<String>,
    pub item_name: Option<String>,
    pub brand: Option<String>,
    pub browse_classification: Option<BrowseClassification>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseClassification {
    pub display_name: String,
    #[serde(default)]
    pub classification_id: Option<String>,
}

impl CatalogItem {
    /// Item name from the first summary that carries one.
    #[must_use]
    pub fn item_name(&self) -> Option<&str> {
        self.summaries
            .iter()
            .find_map(|summary| summary.item_name.as_deref())
    }

    /// Browse-node display name from the first summary that carries one.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.summaries
            .iter()
            .find_map(|summary| summary.browse_classification.as_ref())
            .map(|classification| classification.display_name.as_str())
    }
}

// =============================================================================
// Orders API (getOrders / getOrderItems, v0)
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct OrdersResponse {
    pub payload: OrdersPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct OrdersPayload {
    pub orders: Vec<Order>,
    pub next_token: Option<String>,
}

/// Monetary amount as sent by the Orders API; `Amount` is a decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Money {
    pub currency_code: String,
    pub amount: Decimal,
}

/// An order header from the Orders API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    pub amazon_order_id: String,
    pub purchase_date: DateTime<Utc>,
    pub order_status: String,
    #[serde(default)]
    pub marketplace_id: Option<String>,
    #[serde(default)]
    pub order_total: Option<Money>,
    #[serde(default)]
    pub number_of_items_shipped: Option<i32>,
}

/// One page of orders.
#[derive(Debug)]
pub struct OrdersPage {
    pub orders: Vec<Order>,
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderItemsResponse {
    pub payload: OrderItemsPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct OrderItemsPayload {
    pub order_items: Vec<OrderItem>,
    pub next_token: Option<String>,
}

/// A line item of an order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderItem {
    #[serde(rename = "ASIN")]
    pub asin: String,
    #[serde(rename = "SellerSKU", default)]
    pub seller_sku: Option<String>,
    pub order_item_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub quantity_ordered: i32,
    #[serde(default)]
    pub item_price: Option<Money>,
}

/// One page of order items.
#[derive(Debug)]
pub struct OrderItemsPage {
    pub items: Vec<OrderItem>,
    pub next_token: Option<String>,
}

// =============================================================================
// Finances API (listFinancialEvents, v0)
// =============================================================================

// The finance types also derive Serialize: ingested events are persisted
// verbatim (in wire shape) alongside the derived amounts for audit.

#[derive(Debug, Deserialize)]
pub(crate) struct FinancialEventsResponse {
    pub payload: FinancialEventsPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct FinancialEventsPayload {
    pub financial_events: FinancialEvents,
    pub next_token: Option<String>,
}

/// Event groups returned by one `listFinancialEvents` page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FinancialEvents {
    pub shipment_event_list: Vec<ShipmentEvent>,
    pub refund_event_list: Vec<ShipmentEvent>,
    pub service_fee_event_list: Vec<ServiceFeeEvent>,
}

/// A shipment or refund event. Shipments carry `ShipmentItemList`, refunds
/// carry `ShipmentItemAdjustmentList`; the wire shape is otherwise identical.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ShipmentEvent {
    pub amazon_order_id: Option<String>,
    /// Kept as the raw RFC 3339 string; it feeds the dedup key and must be
    /// byte-stable across re-ingestions.
    pub posted_date: Option<String>,
    pub shipment_item_list: Vec<ShipmentItem>,
    pub shipment_item_adjustment_list: Vec<ShipmentItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ShipmentItem {
    #[serde(rename = "SellerSKU")]
    pub seller_sku: Option<String>,
    pub quantity_shipped: Option<i32>,
    pub item_charge_list: Vec<ChargeComponent>,
    pub item_fee_list: Vec<FeeComponent>,
    pub item_charge_adjustment_list: Vec<ChargeComponent>,
    pub item_fee_adjustment_list: Vec<FeeComponent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ChargeComponent {
    pub charge_type: Option<String>,
    pub charge_amount: Option<CurrencyAmount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FeeComponent {
    pub fee_type: Option<String>,
    pub fee_amount: Option<CurrencyAmount>,
}

/// Monetary amount as sent by the Finances API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CurrencyAmount {
    pub currency_code: Option<String>,
    pub currency_amount: Decimal,
}

/// A service fee event (subscription fees, storage fees, ad charges...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceFeeEvent {
    pub amazon_order_id: Option<String>,
    pub posted_date: Option<String>,
    pub fee_reason: Option<String>,
    pub fee_list: Vec<FeeComponent>,
}

/// One page of financial events.
#[derive(Debug)]
pub struct FinancialEventsPage {
    pub events: FinancialEvents,
    pub next_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_deserializes_string_amount_exactly() {
        let json = r#"{
            "AmazonOrderId": "026-1234567-1234567",
            "PurchaseDate": "2026-07-14T19:49:35Z",
            "OrderStatus": "Shipped",
            "MarketplaceId": "A2Q3Y263D00KWC",
            "OrderTotal": {"CurrencyCode": "BRL", "Amount": "143.90"},
            "NumberOfItemsShipped": 2
        }"#;

        let order: Order = serde_json::from_str(json).expect("order json");
        assert_eq!(order.amazon_order_id, "026-1234567-1234567");
        assert_eq!(order.order_status, "Shipped");

        let total = order.order_total.expect("total");
        assert_eq!(total.currency_code, "BRL");
        // The string path must be exact, including trailing zeros
        assert_eq!(total.amount.to_string(), "143.90");
    }

    #[test]
    fn test_order_item_irregular_field_names() {
        let json = r#"{
            "ASIN": "B07XAMPLE1",
            "SellerSKU": "KIT-CAPA-01",
            "OrderItemId": "05015851154158",
            "Title": "Capa protetora",
            "QuantityOrdered": 3,
            "ItemPrice": {"CurrencyCode": "BRL", "Amount": "59.70"}
        }"#;

        let item: OrderItem = serde_json::from_str(json).expect("order item json");
        assert_eq!(item.asin, "B07XAMPLE1");
        assert_eq!(item.seller_sku.as_deref(), Some("KIT-CAPA-01"));
        assert_eq!(item.quantity_ordered, 3);
    }

    #[test]
    fn test_inventory_summary_page() {
        let json = r#"{
            "payload": {
                "inventorySummaries": [
                    {
                        "asin": "B07XAMPLE1",
                        "fnSku": "X001ABCDEF",
                        "sellerSku": "KIT-CAPA-01",
                        "condition": "NewItem",
                        "productName": "Capa protetora",
                        "totalQuantity": 42
                    },
                    {"sellerSku": "SKU-NO-DETAILS"}
                ]
            },
            "pagination": {"nextToken": "abc123"}
        }"#;

        let response: InventorySummariesResponse =
            serde_json::from_str(json).expect("inventory json");
        assert_eq!(response.payload.inventory_summaries.len(), 2);
        let first = &response.payload.inventory_summaries[0];
        assert_eq!(first.seller_sku.as_deref(), Some("KIT-CAPA-01"));
        assert_eq!(first.total_quantity, Some(42));
        assert_eq!(
            response.pagination.and_then(|p| p.next_token).as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_catalog_item_enrichment_accessors() {
        let json = r#"{
            "asin": "B07XAMPLE1",
            "summaries": [
                {
                    "marketplaceId": "A2Q3Y263D00KWC",
                    "itemName": "Capa protetora universal",
                    "brand": "Acme",
                    "browseClassification": {
                        "displayName": "Acessórios",
                        "classificationId": "16243890011"
                    }
                }
            ]
        }"#;

        let item: CatalogItem = serde_json::from_str(json).expect("catalog json");
        assert_eq!(item.item_name(), Some("Capa protetora universal"));
        assert_eq!(item.category(), Some("Acessórios"));
    }

    #[test]
    fn test_catalog_item_without_summaries() {
        let item: CatalogItem =
            serde_json::from_str(r#"{"asin": "B07XAMPLE1"}"#).expect("bare catalog json");
        assert_eq!(item.item_name(), None);
        assert_eq!(item.category(), None);
    }

    #[test]
    fn test_financial_events_shipment_round_trip() {
        let json = r#"{
            "payload": {
                "FinancialEvents": {
                    "ShipmentEventList": [
                        {
                            "AmazonOrderId": "026-1234567-1234567",
                            "PostedDate": "2026-07-16T03:10:00Z",
                            "ShipmentItemList": [
                                {
                                    "SellerSKU": "KIT-CAPA-01",
                                    "QuantityShipped": 1,
                                    "ItemChargeList": [
                                        {
                                            "ChargeType": "Principal",
                                            "ChargeAmount": {"CurrencyCode": "BRL", "CurrencyAmount": 100.0}
                                        }
                                    ],
                                    "ItemFeeList": [
                                        {
                                            "FeeType": "Commission",
                                            "FeeAmount": {"CurrencyCode": "BRL", "CurrencyAmount": -15.0}
                                        }
                                    ]
                                }
                            ]
                        }
                    ]
                },
                "NextToken": "page-2"
            }
        }"#;

        let response: FinancialEventsResponse = serde_json::from_str(json).expect("finances json");
        assert_eq!(response.payload.next_token.as_deref(), Some("page-2"));

        let events = response.payload.financial_events;
        assert_eq!(events.shipment_event_list.len(), 1);
        assert!(events.refund_event_list.is_empty());

        let event = &events.shipment_event_list[0];
        assert_eq!(event.posted_date.as_deref(), Some("2026-07-16T03:10:00Z"));

        // Wire shape survives re-serialization (persisted as raw_event)
        let value = serde_json::to_value(event).expect("serialize event");
        assert_eq!(value["AmazonOrderId"], "026-1234567-1234567");
        assert_eq!(
            value["ShipmentItemList"][0]["ItemChargeList"][0]["ChargeType"],
            "Principal"
        );
    }

    #[test]
    fn test_service_fee_event_without_posted_date() {
        let json = r#"{
            "FeeReason": "FBAStorageFee",
            "FeeList": [
                {"FeeType": "FBAStorageFee", "FeeAmount": {"CurrencyCode": "BRL", "CurrencyAmount": -12.34}}
            ]
        }"#;

        let event: ServiceFeeEvent = serde_json::from_str(json).expect("service fee json");
        assert_eq!(event.posted_date, None);
        assert_eq!(event.fee_reason.as_deref(), Some("FBAStorageFee"));
        assert_eq!(event.fee_list.len(), 1);
    }
}
