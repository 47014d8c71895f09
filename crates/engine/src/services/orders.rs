//! Order ingestion: settled orders from the last thirty days.
//!
//! The window is re-scanned on every pass; the unique constraint on
//! (account, amazon order id) turns overlap into cheap skips. Line items are
//! fetched only for orders that actually inserted, which keeps the expensive
//! per-order call off the re-scan path. Header and items commit in one
//! transaction, so a failed item fetch leaves no trace and the order is
//! re-ingested whole on the next pass.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sellerglass_core::{AccountId, ConnectionStatus};
use serde::Serialize;

use crate::db::{self, RepositoryError};
use crate::models::account::MarketplaceAccount;
use crate::models::order::{NewSalesOrder, NewSalesOrderItem};
use crate::spapi::SpApiClient;
use crate::spapi::types::{Order, OrderItem};

use super::sync::SyncService;
use super::{SYNC_WINDOW_DAYS, SyncError};

/// What one order pass did.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct OrderSyncSummary {
    /// Remote orders seen inside the window.
    pub fetched: u32,
    /// Orders ingested for the first time.
    pub created: u32,
    /// Orders already present from an earlier pass.
    pub skipped: u32,
    /// Orders that errored; logged and left for the next pass.
    pub failed: u32,
}

/// Header insert payload for one remote order.
pub(crate) fn order_to_row(account_id: AccountId, order: &Order) -> NewSalesOrder {
    let (order_total, currency) = match &order.order_total {
        Some(money) => (Some(money.amount), Some(money.currency_code.clone())),
        None => (None, None),
    };

    NewSalesOrder {
        account_id,
        amazon_order_id: order.amazon_order_id.clone(),
        marketplace_id: order.marketplace_id.clone(),
        purchase_date: order.purchase_date,
        order_status: order.order_status.clone(),
        order_total,
        currency,
    }
}

/// Line-item insert payload.
///
/// `ItemPrice` on the wire is the line total, not the unit price; the unit
/// price is derived by dividing through the ordered quantity.
pub(crate) fn item_to_row(item: &OrderItem) -> NewSalesOrderItem {
    let quantity = item.quantity_ordered;
    let (item_total, currency) = match &item.item_price {
        Some(money) => (Some(money.amount), Some(money.currency_code.clone())),
        None => (None, None),
    };
    let unit_price = item_total.and_then(|total| {
        (quantity > 0).then(|| total / Decimal::from(quantity))
    });

    NewSalesOrderItem {
        order_item_id: item.order_item_id.clone(),
        asin: item.asin.clone(),
        seller_sku: item.seller_sku.clone(),
        title: item.title.clone(),
        quantity,
        unit_price,
        item_total,
        currency,
    }
}

impl SyncService {
    /// Ingest one account's settled orders.
    ///
    /// The standalone trigger: runs the pass and records the attempt on the
    /// account row either way, like a scheduled run would.
    ///
    /// # Errors
    ///
    /// Returns an error when the account is missing or disconnected, a page
    /// fetch fails, or the account's credentials turn out to be bad.
    pub async fn sync_orders(&self, account_id: AccountId) -> Result<OrderSyncSummary, SyncError> {
        let account = self.sync_target(account_id).await?;
        let result = self.sync_orders_for(&account).await;
        let status = ConnectionStatus::after_sync(result.is_ok());
        db::accounts::record_sync_outcome(&self.pool, account_id, status).await?;
        result
    }

    /// The order pass itself, for an account the caller already vetted.
    pub(crate) async fn sync_orders_for(
        &self,
        account: &MarketplaceAccount,
    ) -> Result<OrderSyncSummary, SyncError> {
        let client = self.clients.client_for(account).await?;
        let created_after = Utc::now() - Duration::days(SYNC_WINDOW_DAYS);

        let mut summary = OrderSyncSummary::default();
        let mut next_token: Option<String> = None;

        loop {
            let page = client.get_orders(created_after, next_token.as_deref()).await?;

            for order in &page.orders {
                summary.fetched += 1;
                match self.ingest_order(account, &client, order).await {
                    Ok(true) => summary.created += 1,
                    Ok(false) => summary.skipped += 1,
                    // Bad credentials fail every remaining order identically
                    Err(error) if error.is_auth_failure() => return Err(error),
                    Err(error) => {
                        summary.failed += 1;
                        tracing::warn!(
                            account_id = %account.id,
                            amazon_order_id = %order.amazon_order_id,
                            %error,
                            "failed to ingest order"
                        );
                    }
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
            created = summary.created,
            skipped = summary.skipped,
            failed = summary.failed,
            "order ingestion finished"
        );

        Ok(summary)
    }

    /// Insert one order; `Ok(true)` means it was new and its items landed.
    ///
    /// Header and items are written in one transaction. An error between the
    /// header insert and the item inserts rolls the header back, so a
    /// transient item-fetch failure cannot leave an item-less order that the
    /// conflict check would skip forever after.
    async fn ingest_order(
        &self,
        account: &MarketplaceAccount,
        client: &SpApiClient,
        order: &Order,
    ) -> Result<bool, SyncError> {
        let row = order_to_row(account.id, order);

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let Some(inserted) = db::orders::insert_order(&mut tx, &row).await? else {
            return Ok(false);
        };

        let mut items = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let page = client
                .get_order_items(&order.amazon_order_id, next_token.as_deref())
                .await?;
            items.extend(page.items.iter().map(item_to_row));
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        db::orders::insert_order_items(&mut tx, inserted.id, &items).await?;
        tx.commit().await.map_err(RepositoryError::from)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spapi::types::Money;

    fn remote_order() -> Order {
        Order {
            amazon_order_id: "026-1234567-1234567".to_owned(),
            purchase_date: "2026-07-14T19:49:35Z".parse().expect("date"),
            order_status: "Shipped".to_owned(),
            marketplace_id: Some("A2Q3Y263D00KWC".to_owned()),
            order_total: Some(Money {
                currency_code: "BRL".to_owned(),
                amount: Decimal::new(14390, 2),
            }),
            number_of_items_shipped: Some(2),
        }
    }

    #[test]
    fn test_order_row_carries_total_and_currency() {
        let account_id = AccountId::generate();
        let row = order_to_row(account_id, &remote_order());

        assert_eq!(row.account_id, account_id);
        assert_eq!(row.amazon_order_id, "026-1234567-1234567");
        assert_eq!(row.order_status, "Shipped");
        assert_eq!(row.order_total, Some(Decimal::new(14390, 2)));
        assert_eq!(row.currency.as_deref(), Some("BRL"));
    }

    #[test]
    fn test_order_row_without_total() {
        let mut order = remote_order();
        order.order_total = None;

        let row = order_to_row(AccountId::generate(), &order);
        assert_eq!(row.order_total, None);
        assert_eq!(row.currency, None);
    }

    fn remote_item(quantity: i32, price: Option<Decimal>) -> OrderItem {
        OrderItem {
            asin: "B07XAMPLE1".to_owned(),
            seller_sku: Some("KIT-CAPA-01".to_owned()),
            order_item_id: "05015851154158".to_owned(),
            title: Some("Capa protetora".to_owned()),
            quantity_ordered: quantity,
            item_price: price.map(|amount| Money {
                currency_code: "BRL".to_owned(),
                amount,
            }),
        }
    }

    #[test]
    fn test_item_unit_price_is_total_divided_by_quantity() {
        // ItemPrice 59.70 across three units is 19.90 each
        let row = item_to_row(&remote_item(3, Some(Decimal::new(5970, 2))));
        assert_eq!(row.item_total, Some(Decimal::new(5970, 2)));
        assert_eq!(row.unit_price, Some(Decimal::new(1990, 2)));
        assert_eq!(row.quantity, 3);
    }

    #[test]
    fn test_item_zero_quantity_has_no_unit_price() {
        let row = item_to_row(&remote_item(0, Some(Decimal::new(5970, 2))));
        assert_eq!(row.item_total, Some(Decimal::new(5970, 2)));
        assert_eq!(row.unit_price, None);
    }

    #[test]
    fn test_item_without_price() {
        let row = item_to_row(&remote_item(1, None));
        assert_eq!(row.item_total, None);
        assert_eq!(row.unit_price, None);
        assert_eq!(row.currency, None);
    }
}
