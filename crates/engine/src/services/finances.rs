//! Financial event ingestion and classification.
//!
//! Every event reduces to three amounts over its charge list: `gross` sums
//! the `Principal` charges (revenue), `fee` sums the absolute value of every
//! non-`Principal` charge, and `net` is the signed sum of everything. That
//! Principal/non-Principal split is the accounting rule the profitability
//! numbers stand on.
//!
//! Idempotency comes from a content-derived dedup key instead of a high-water
//! mark, so re-scanning an overlapping window (or a manual trigger racing a
//! scheduled one) can never double-book an event.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sellerglass_core::{AccountId, ConnectionStatus, FinancialEventType};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::db;
use crate::models::account::MarketplaceAccount;
use crate::models::transaction::NewFinancialTransaction;
use crate::spapi::types::{ChargeComponent, FeeComponent, ServiceFeeEvent, ShipmentEvent};

use super::sync::SyncService;
use super::{SYNC_WINDOW_DAYS, SyncError};

/// Currency recorded when no charge on an event carries one.
const FALLBACK_CURRENCY: &str = "USD";

/// What one finance pass did. `fetched` always equals
/// `recorded + duplicates + empty`.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct FinanceSyncSummary {
    /// Events seen inside the window.
    pub fetched: u32,
    /// Ledger lines written for the first time.
    pub recorded: u32,
    /// Events already recorded on an earlier pass.
    pub duplicates: u32,
    /// Events without monetary content.
    pub empty: u32,
}

/// One monetary component of an event, flattened from the wire shape.
#[derive(Debug, Clone)]
pub(crate) struct Charge {
    pub charge_type: Option<String>,
    pub amount: Decimal,
    pub currency: Option<String>,
}

/// Classified totals over an event's charges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChargeTotals {
    pub gross: Decimal,
    pub fee: Decimal,
    pub net: Decimal,
}

/// Reduce a charge list to gross/fee/net.
pub(crate) fn classify_charges(charges: &[Charge]) -> ChargeTotals {
    let mut totals = ChargeTotals::default();
    for charge in charges {
        totals.net += charge.amount;
        if charge.charge_type.as_deref() == Some("Principal") {
            totals.gross += charge.amount;
        } else {
            totals.fee += charge.amount.abs();
        }
    }
    totals
}

/// Every charge on a shipment or refund event, including the adjustment
/// lists refunds are delivered through.
pub(crate) fn collect_shipment_charges(event: &ShipmentEvent) -> Vec<Charge> {
    let mut charges = Vec::new();
    for item in event
        .shipment_item_list
        .iter()
        .chain(&event.shipment_item_adjustment_list)
    {
        push_charges(&mut charges, &item.item_charge_list);
        push_charges(&mut charges, &item.item_charge_adjustment_list);
        push_fees(&mut charges, &item.item_fee_list);
        push_fees(&mut charges, &item.item_fee_adjustment_list);
    }
    charges
}

/// Every fee on a service-fee event.
pub(crate) fn collect_service_fee_charges(event: &ServiceFeeEvent) -> Vec<Charge> {
    let mut charges = Vec::new();
    push_fees(&mut charges, &event.fee_list);
    charges
}

fn push_charges(out: &mut Vec<Charge>, components: &[ChargeComponent]) {
    for component in components {
        if let Some(amount) = &component.charge_amount {
            out.push(Charge {
                charge_type: component.charge_type.clone(),
                amount: amount.currency_amount,
                currency: amount.currency_code.clone(),
            });
        }
    }
}

fn push_fees(out: &mut Vec<Charge>, components: &[FeeComponent]) {
    for component in components {
        if let Some(amount) = &component.fee_amount {
            out.push(Charge {
                charge_type: component.fee_type.clone(),
                amount: amount.currency_amount,
                currency: amount.currency_code.clone(),
            });
        }
    }
}

/// Currency of the first charge that carries one.
pub(crate) fn charge_currency(charges: &[Charge]) -> String {
    charges
        .iter()
        .find_map(|charge| charge.currency.clone())
        .unwrap_or_else(|| FALLBACK_CURRENCY.to_owned())
}

/// Stable idempotency key for one event.
///
/// Hashes the event type, order id, the posted date exactly as received
/// (re-formatting could change the bytes between passes), and the net
/// amount. Two passes over the same window derive identical keys and the
/// unique constraint turns the second insert into a skip.
pub(crate) fn dedup_key(
    event_type: FinancialEventType,
    amazon_order_id: Option<&str>,
    posted_date_raw: Option<&str>,
    net: Decimal,
) -> String {
    let payload = format!(
        "{event_type}|{}|{}|{net}",
        amazon_order_id.unwrap_or_default(),
        posted_date_raw.unwrap_or_default(),
    );
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

/// Posted date parsed for querying; the raw string stays in the dedup key.
pub(crate) fn parse_posted_date(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map_or_else(Utc::now, |parsed| parsed.with_timezone(&Utc))
}

/// Human-readable ledger line description.
pub(crate) fn event_description(
    event_type: FinancialEventType,
    amazon_order_id: Option<&str>,
    fee_reason: Option<&str>,
) -> String {
    match event_type {
        FinancialEventType::Shipment => match amazon_order_id {
            Some(id) => format!("Pedido {id}"),
            None => "Pedido".to_owned(),
        },
        FinancialEventType::Refund => match amazon_order_id {
            Some(id) => format!("Reembolso {id}"),
            None => "Reembolso".to_owned(),
        },
        FinancialEventType::ServiceFee => fee_reason
            .filter(|reason| !reason.is_empty())
            .map_or_else(|| "Tarifa de serviço".to_owned(), str::to_owned),
    }
}

/// Ledger line for a shipment or refund event; `None` when the event has no
/// monetary content.
pub(crate) fn shipment_transaction(
    account_id: AccountId,
    event_type: FinancialEventType,
    event: &ShipmentEvent,
) -> Option<NewFinancialTransaction> {
    let charges = collect_shipment_charges(event);
    if charges.is_empty() {
        return None;
    }
    let totals = classify_charges(&charges);

    Some(NewFinancialTransaction {
        account_id,
        amazon_order_id: event.amazon_order_id.clone(),
        event_type,
        description: event_description(event_type, event.amazon_order_id.as_deref(), None),
        gross_amount: totals.gross,
        fee_amount: totals.fee,
        net_amount: totals.net,
        currency: charge_currency(&charges),
        posted_at: parse_posted_date(event.posted_date.as_deref()),
        dedup_key: dedup_key(
            event_type,
            event.amazon_order_id.as_deref(),
            event.posted_date.as_deref(),
            totals.net,
        ),
        raw_event: serde_json::to_value(event).unwrap_or(serde_json::Value::Null),
    })
}

/// Ledger line for a service-fee event.
pub(crate) fn service_fee_transaction(
    account_id: AccountId,
    event: &ServiceFeeEvent,
) -> Option<NewFinancialTransaction> {
    let charges = collect_service_fee_charges(event);
    if charges.is_empty() {
        return None;
    }
    let totals = classify_charges(&charges);
    let event_type = FinancialEventType::ServiceFee;

    Some(NewFinancialTransaction {
        account_id,
        amazon_order_id: event.amazon_order_id.clone(),
        event_type,
        description: event_description(
            event_type,
            event.amazon_order_id.as_deref(),
            event.fee_reason.as_deref(),
        ),
        gross_amount: totals.gross,
        fee_amount: totals.fee,
        net_amount: totals.net,
        currency: charge_currency(&charges),
        posted_at: parse_posted_date(event.posted_date.as_deref()),
        dedup_key: dedup_key(
            event_type,
            event.amazon_order_id.as_deref(),
            event.posted_date.as_deref(),
            totals.net,
        ),
        raw_event: serde_json::to_value(event).unwrap_or(serde_json::Value::Null),
    })
}

impl SyncService {
    /// Ingest one account's financial events.
    ///
    /// The standalone trigger: runs the pass and records the attempt on the
    /// account row either way, like a scheduled run would.
    ///
    /// # Errors
    ///
    /// Returns an error when the account is missing or disconnected, a page
    /// fetch fails, or storage rejects a write.
    pub async fn sync_finances(
        &self,
        account_id: AccountId,
    ) -> Result<FinanceSyncSummary, SyncError> {
        let account = self.sync_target(account_id).await?;
        let result = self.sync_finances_for(&account).await;
        let status = ConnectionStatus::after_sync(result.is_ok());
        db::accounts::record_sync_outcome(&self.pool, account_id, status).await?;
        result
    }

    /// The finance pass itself, for an account the caller already vetted.
    pub(crate) async fn sync_finances_for(
        &self,
        account: &MarketplaceAccount,
    ) -> Result<FinanceSyncSummary, SyncError> {
        let client = self.clients.client_for(account).await?;
        let posted_after = Utc::now() - Duration::days(SYNC_WINDOW_DAYS);

        let mut summary = FinanceSyncSummary::default();
        let mut next_token: Option<String> = None;

        loop {
            let page = client
                .list_financial_events(posted_after, next_token.as_deref())
                .await?;

            self.record_shipment_events(
                account,
                &page.events.shipment_event_list,
                FinancialEventType::Shipment,
                &mut summary,
            )
            .await?;
            self.record_shipment_events(
                account,
                &page.events.refund_event_list,
                FinancialEventType::Refund,
                &mut summary,
            )
            .await?;

            for event in &page.events.service_fee_event_list {
                summary.fetched += 1;
                match service_fee_transaction(account.id, event) {
                    Some(row) => self.record_transaction(&row, &mut summary).await?,
                    None => summary.empty += 1,
                }
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        tracing::info!(
            account_id = %account.id,
            fetched = summary.fetched,
            recorded = summary.recorded,
            duplicates = summary.duplicates,
            empty = summary.empty,
            "financial event ingestion finished"
        );

        Ok(summary)
    }

    async fn record_shipment_events(
        &self,
        account: &MarketplaceAccount,
        events: &[ShipmentEvent],
        event_type: FinancialEventType,
        summary: &mut FinanceSyncSummary,
    ) -> Result<(), SyncError> {
        for event in events {
            summary.fetched += 1;
            match shipment_transaction(account.id, event_type, event) {
                Some(row) => self.record_transaction(&row, summary).await?,
                None => summary.empty += 1,
            }
        }
        Ok(())
    }

    async fn record_transaction(
        &self,
        row: &NewFinancialTransaction,
        summary: &mut FinanceSyncSummary,
    ) -> Result<(), SyncError> {
        if db::transactions::insert_transaction(&self.pool, row).await? {
            summary.recorded += 1;
        } else {
            summary.duplicates += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spapi::types::{CurrencyAmount, ShipmentItem};

    fn charge(charge_type: &str, amount: i64) -> Charge {
        Charge {
            charge_type: Some(charge_type.to_owned()),
            amount: Decimal::from(amount),
            currency: Some("BRL".to_owned()),
        }
    }

    #[test]
    fn test_principal_split_reference_vector() {
        // Principal 100, Commission -15, Shipping -5
        let charges = vec![
            charge("Principal", 100),
            charge("Commission", -15),
            charge("ShippingCharge", -5),
        ];

        let totals = classify_charges(&charges);
        assert_eq!(totals.gross, Decimal::from(100));
        assert_eq!(totals.fee, Decimal::from(20));
        assert_eq!(totals.net, Decimal::from(80));
    }

    #[test]
    fn test_refund_vector_has_negative_net() {
        let charges = vec![charge("Principal", -50), charge("Commission", 5)];

        let totals = classify_charges(&charges);
        assert_eq!(totals.gross, Decimal::from(-50));
        assert_eq!(totals.fee, Decimal::from(5));
        assert_eq!(totals.net, Decimal::from(-45));
    }

    #[test]
    fn test_untyped_charge_counts_as_fee() {
        let charges = vec![Charge {
            charge_type: None,
            amount: Decimal::from(-3),
            currency: None,
        }];

        let totals = classify_charges(&charges);
        assert_eq!(totals.gross, Decimal::ZERO);
        assert_eq!(totals.fee, Decimal::from(3));
        assert_eq!(totals.net, Decimal::from(-3));
    }

    fn wire_amount(amount: i64) -> Option<CurrencyAmount> {
        Some(CurrencyAmount {
            currency_code: Some("BRL".to_owned()),
            currency_amount: Decimal::from(amount),
        })
    }

    fn shipment_event(order_id: &str) -> ShipmentEvent {
        ShipmentEvent {
            amazon_order_id: Some(order_id.to_owned()),
            posted_date: Some("2026-07-16T03:10:00Z".to_owned()),
            shipment_item_list: vec![ShipmentItem {
                seller_sku: Some("KIT-CAPA-01".to_owned()),
                quantity_shipped: Some(1),
                item_charge_list: vec![ChargeComponent {
                    charge_type: Some("Principal".to_owned()),
                    charge_amount: wire_amount(100),
                }],
                item_fee_list: vec![FeeComponent {
                    fee_type: Some("Commission".to_owned()),
                    fee_amount: wire_amount(-15),
                }],
                item_charge_adjustment_list: Vec::new(),
                item_fee_adjustment_list: Vec::new(),
            }],
            shipment_item_adjustment_list: Vec::new(),
        }
    }

    #[test]
    fn test_shipment_transaction_from_wire_event() {
        let account_id = AccountId::generate();
        let event = shipment_event("026-1234567-1234567");

        let row = shipment_transaction(account_id, FinancialEventType::Shipment, &event)
            .expect("has charges");
        assert_eq!(row.account_id, account_id);
        assert_eq!(row.event_type, FinancialEventType::Shipment);
        assert_eq!(row.description, "Pedido 026-1234567-1234567");
        assert_eq!(row.gross_amount, Decimal::from(100));
        assert_eq!(row.fee_amount, Decimal::from(15));
        assert_eq!(row.net_amount, Decimal::from(85));
        assert_eq!(row.currency, "BRL");
        assert_eq!(row.posted_at.to_rfc3339(), "2026-07-16T03:10:00+00:00");
        assert_eq!(row.raw_event["AmazonOrderId"], "026-1234567-1234567");
    }

    #[test]
    fn test_event_without_charges_is_empty() {
        let event = ShipmentEvent {
            amazon_order_id: Some("026-0000000-0000000".to_owned()),
            posted_date: Some("2026-07-16T03:10:00Z".to_owned()),
            shipment_item_list: Vec::new(),
            shipment_item_adjustment_list: Vec::new(),
        };

        let row = shipment_transaction(AccountId::generate(), FinancialEventType::Shipment, &event);
        assert!(row.is_none());
    }

    #[test]
    fn test_refund_adjustment_lists_are_collected() {
        let event = ShipmentEvent {
            amazon_order_id: Some("026-7654321-7654321".to_owned()),
            posted_date: Some("2026-07-20T12:00:00Z".to_owned()),
            shipment_item_list: Vec::new(),
            shipment_item_adjustment_list: vec![ShipmentItem {
                seller_sku: None,
                quantity_shipped: None,
                item_charge_list: Vec::new(),
                item_fee_list: Vec::new(),
                item_charge_adjustment_list: vec![ChargeComponent {
                    charge_type: Some("Principal".to_owned()),
                    charge_amount: wire_amount(-50),
                }],
                item_fee_adjustment_list: vec![FeeComponent {
                    fee_type: Some("Commission".to_owned()),
                    fee_amount: wire_amount(5),
                }],
            }],
        };

        let row = shipment_transaction(AccountId::generate(), FinancialEventType::Refund, &event)
            .expect("has adjustments");
        assert_eq!(row.description, "Reembolso 026-7654321-7654321");
        assert_eq!(row.gross_amount, Decimal::from(-50));
        assert_eq!(row.fee_amount, Decimal::from(5));
        assert_eq!(row.net_amount, Decimal::from(-45));
    }

    #[test]
    fn test_service_fee_description_uses_reason() {
        let event = ServiceFeeEvent {
            amazon_order_id: None,
            posted_date: Some("2026-07-01T00:00:00Z".to_owned()),
            fee_reason: Some("FBAStorageFee".to_owned()),
            fee_list: vec![FeeComponent {
                fee_type: Some("FBAStorageFee".to_owned()),
                fee_amount: wire_amount(-12),
            }],
        };

        let row = service_fee_transaction(AccountId::generate(), &event).expect("has fees");
        assert_eq!(row.event_type, FinancialEventType::ServiceFee);
        assert_eq!(row.description, "FBAStorageFee");
        assert_eq!(row.amazon_order_id, None);
        assert_eq!(row.net_amount, Decimal::from(-12));
    }

    #[test]
    fn test_service_fee_description_fallback() {
        assert_eq!(
            event_description(FinancialEventType::ServiceFee, None, None),
            "Tarifa de serviço"
        );
        assert_eq!(
            event_description(FinancialEventType::ServiceFee, None, Some("")),
            "Tarifa de serviço"
        );
    }

    #[test]
    fn test_dedup_key_is_stable_and_lowercase_hex() {
        let a = dedup_key(
            FinancialEventType::Shipment,
            Some("026-1234567-1234567"),
            Some("2026-07-16T03:10:00Z"),
            Decimal::from(85),
        );
        let b = dedup_key(
            FinancialEventType::Shipment,
            Some("026-1234567-1234567"),
            Some("2026-07-16T03:10:00Z"),
            Decimal::from(85),
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.bytes().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_dedup_key_differs_per_component() {
        let base = dedup_key(
            FinancialEventType::Shipment,
            Some("026-1234567-1234567"),
            Some("2026-07-16T03:10:00Z"),
            Decimal::from(85),
        );

        let other_type = dedup_key(
            FinancialEventType::Refund,
            Some("026-1234567-1234567"),
            Some("2026-07-16T03:10:00Z"),
            Decimal::from(85),
        );
        let other_net = dedup_key(
            FinancialEventType::Shipment,
            Some("026-1234567-1234567"),
            Some("2026-07-16T03:10:00Z"),
            Decimal::from(84),
        );
        let missing_order = dedup_key(
            FinancialEventType::Shipment,
            None,
            Some("2026-07-16T03:10:00Z"),
            Decimal::from(85),
        );

        assert_ne!(base, other_type);
        assert_ne!(base, other_net);
        assert_ne!(base, missing_order);
    }

    #[test]
    fn test_posted_date_parses_rfc3339_and_survives_garbage() {
        let parsed = parse_posted_date(Some("2026-07-16T03:10:00Z"));
        assert_eq!(parsed.to_rfc3339(), "2026-07-16T03:10:00+00:00");

        let before = Utc::now();
        let fallback = parse_posted_date(Some("not-a-date"));
        assert!(fallback >= before);

        let missing = parse_posted_date(None);
        assert!(missing >= before);
    }

    #[test]
    fn test_currency_fallback() {
        assert_eq!(charge_currency(&[]), "USD");

        let charges = vec![
            Charge {
                charge_type: Some("Principal".to_owned()),
                amount: Decimal::from(10),
                currency: None,
            },
            charge("Commission", -1),
        ];
        assert_eq!(charge_currency(&charges), "BRL");
    }
}
