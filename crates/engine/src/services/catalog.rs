//! Catalog reconciliation: remote FBA inventory against the owner's catalog.
//!
//! Remote items are keyed by seller SKU, never by ASIN - variations can share
//! an ASIN while the seller's own SKU stays unique per account. A known SKU
//! refreshes its listing in place; an unknown SKU auto-creates a product
//! (best-effort enriched from the catalog API) before the listing lands.

use std::collections::HashMap;

use sellerglass_core::{AccountId, ConnectionStatus, OwnerId, ProductId};
use serde::Serialize;

use crate::db::{self, RepositoryError};
use crate::models::account::MarketplaceAccount;
use crate::models::listing::ListingUpsert;
use crate::models::product::{NewProduct, Product};
use crate::spapi::SpApiClient;
use crate::spapi::types::InventorySummary;

use super::SyncError;
use super::sync::SyncService;

/// What one catalog pass did. `existing + created == total` always holds;
/// remote rows without a seller SKU cannot be reconciled and are not counted.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct CatalogSyncSummary {
    pub total: u32,
    pub existing: u32,
    pub created: u32,
}

/// One page of remote inventory split by whether the SKU is already known.
#[derive(Debug)]
pub(crate) struct ReconciliationPlan<'a> {
    pub matched: Vec<(&'a InventorySummary, ProductId)>,
    pub discovered: Vec<&'a InventorySummary>,
    pub unkeyed: usize,
}

/// Split a page of inventory summaries against the owner's SKU index.
pub(crate) fn plan_reconciliation<'a>(
    summaries: &'a [InventorySummary],
    known: &HashMap<String, ProductId>,
) -> ReconciliationPlan<'a> {
    let mut plan = ReconciliationPlan {
        matched: Vec::new(),
        discovered: Vec::new(),
        unkeyed: 0,
    };

    for summary in summaries {
        match summary.seller_sku.as_deref().filter(|sku| !sku.is_empty()) {
            Some(sku) => match known.get(sku) {
                Some(&product_id) => plan.matched.push((summary, product_id)),
                None => plan.discovered.push(summary),
            },
            None => plan.unkeyed += 1,
        }
    }

    plan
}

/// Product name for a remote item the catalog has never seen.
///
/// The inventory feed usually carries a display name; when it does not, the
/// synthetic `Produto <SKU>` placeholder stands in until catalog enrichment
/// replaces it.
pub(crate) fn discovered_product_name(summary: &InventorySummary, seller_sku: &str) -> String {
    summary
        .product_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .map_or_else(|| format!("Produto {seller_sku}"), str::to_owned)
}

/// Listing lifecycle value derived from stock on hand.
pub(crate) fn listing_status(quantity: i32) -> &'static str {
    if quantity > 0 { "active" } else { "inactive" }
}

impl SyncService {
    /// Reconcile one account's remote inventory into the owner's catalog.
    ///
    /// The standalone trigger: verifies ownership, runs the pass, and records
    /// the attempt on the account row either way.
    ///
    /// # Errors
    ///
    /// Returns an error when the account is missing, owned by someone else,
    /// disconnected, or the pass itself fails.
    pub async fn sync_products(
        &self,
        account_id: AccountId,
        owner_id: OwnerId,
    ) -> Result<CatalogSyncSummary, SyncError> {
        let account = self.sync_target(account_id).await?;
        if account.owner_id != owner_id {
            return Err(SyncError::OwnerMismatch(account_id));
        }

        let result = self.sync_products_for(&account, false).await;
        let status = ConnectionStatus::after_sync(result.is_ok());
        db::accounts::record_sync_outcome(&self.pool, account_id, status).await?;
        result
    }

    /// The catalog pass itself, for an account the caller already vetted.
    ///
    /// With `refresh` set, items whose SKU is already known also get their
    /// product re-enriched from the catalog API (the daily cadence); without
    /// it only newly discovered products are enriched.
    pub(crate) async fn sync_products_for(
        &self,
        account: &MarketplaceAccount,
        refresh: bool,
    ) -> Result<CatalogSyncSummary, SyncError> {
        let client = self.clients.client_for(account).await?;
        let mut known = db::products::sku_index(&self.pool, account.owner_id).await?;

        let mut summary = CatalogSyncSummary::default();
        let mut next_token: Option<String> = None;

        loop {
            let page = client.get_inventory_summaries(next_token.as_deref()).await?;
            let plan = plan_reconciliation(&page.summaries, &known);

            if plan.unkeyed > 0 {
                tracing::debug!(
                    account_id = %account.id,
                    count = plan.unkeyed,
                    "skipping inventory rows without a seller SKU"
                );
            }

            let mut created = Vec::new();
            for (item, product_id) in plan.matched {
                if refresh && let Some(asin) = item.asin.as_deref() {
                    self.enrich_product(&client, product_id, asin).await;
                }
                self.store_listing(account, product_id, item).await?;
                summary.existing += 1;
                summary.total += 1;
            }

            for item in plan.discovered {
                let product = self.create_discovered_product(account, &client, item).await?;
                created.push((remote_sku(item), product.id));
                self.store_listing(account, product.id, item).await?;
                summary.created += 1;
                summary.total += 1;
            }

            // Make this page's creations visible to the next page's plan
            known.extend(created);

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        tracing::info!(
            account_id = %account.id,
            total = summary.total,
            existing = summary.existing,
            created = summary.created,
            "catalog reconciliation finished"
        );

        Ok(summary)
    }

    /// Create a product for a remote SKU the catalog has never seen.
    ///
    /// A creation race with a concurrent pass resolves by re-reading the row
    /// the winner inserted.
    async fn create_discovered_product(
        &self,
        account: &MarketplaceAccount,
        client: &SpApiClient,
        item: &InventorySummary,
    ) -> Result<Product, SyncError> {
        let seller_sku = remote_sku(item);
        let input = NewProduct {
            owner_id: account.owner_id,
            internal_sku: None,
            sku: seller_sku.clone(),
            name: discovered_product_name(item, &seller_sku),
            category: None,
            weight_g: None,
            length_cm: None,
            width_cm: None,
            height_cm: None,
        };

        let product = match db::products::create_product(&self.pool, &input).await {
            Ok(product) => {
                tracing::info!(
                    account_id = %account.id,
                    product_id = %product.id,
                    sku = %product.sku,
                    "auto-created product from remote inventory"
                );
                product
            }
            Err(RepositoryError::Conflict(_)) => {
                db::products::find_product_by_sku(&self.pool, account.owner_id, &seller_sku)
                    .await?
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "product with SKU {seller_sku} missing after insert conflict"
                        ))
                    })?
            }
            Err(error) => return Err(error.into()),
        };

        if let Some(asin) = item.asin.as_deref() {
            self.enrich_product(client, product.id, asin).await;
        }

        Ok(product)
    }

    /// Best-effort title/category enrichment from the catalog API.
    ///
    /// Never fails the pass: a missing catalog entry or a throttled lookup
    /// leaves the product with its inventory-feed name.
    async fn enrich_product(&self, client: &SpApiClient, product_id: ProductId, asin: &str) {
        let item = match client.get_catalog_item(asin).await {
            Ok(item) => item,
            Err(error) => {
                tracing::debug!(%product_id, asin, %error, "catalog lookup failed");
                return;
            }
        };

        let Some(name) = item.item_name() else {
            return;
        };

        if let Err(error) =
            db::products::update_product_enrichment(&self.pool, product_id, name, item.category())
                .await
        {
            tracing::warn!(%product_id, %error, "failed to store catalog enrichment");
        }
    }

    async fn store_listing(
        &self,
        account: &MarketplaceAccount,
        product_id: ProductId,
        item: &InventorySummary,
    ) -> Result<(), SyncError> {
        let quantity = item.total_quantity.unwrap_or(0);
        let upsert = ListingUpsert {
            product_id,
            account_id: account.id,
            asin: item.asin.clone().unwrap_or_default(),
            seller_sku: remote_sku(item),
            status: listing_status(quantity).to_owned(),
            quantity,
            price: None,
        };
        db::listings::upsert_listing(&self.pool, &upsert).await?;
        Ok(())
    }
}

/// Seller SKU of a planned item. Plans only contain keyed items, so this
/// never sees a row without one.
fn remote_sku(item: &InventorySummary) -> String {
    item.seller_sku.clone().unwrap_or_default()
}
