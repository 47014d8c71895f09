//! The per-account sync facade.
//!
//! [`SyncService`] owns the database pool and the client cache; the actual
//! sync passes live in the sibling modules ([`super::catalog`],
//! [`super::orders`], [`super::finances`]) as `impl SyncService` blocks.
//! This module holds the shared plumbing: loading the target account,
//! running a [`SyncSelection`] with all-settle semantics, and recording the
//! attempt's outcome on the account row.

use sellerglass_core::{AccountId, ConnectionStatus, SyncKind};
use serde::Serialize;
use sqlx::PgPool;

use crate::db;
use crate::models::account::MarketplaceAccount;

use super::SyncError;
use super::catalog::CatalogSyncSummary;
use super::clients::ClientManager;
use super::finances::FinanceSyncSummary;
use super::orders::OrderSyncSummary;

/// Which sync passes a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSelection {
    pub products: bool,
    pub orders: bool,
    pub finances: bool,
    /// Re-fetch catalog details for SKUs that already have a product, not
    /// just for newly discovered ones.
    pub refresh_catalog: bool,
}

impl SyncSelection {
    /// Orders and finances only; the hourly cadence.
    pub const FREQUENT: Self = Self {
        products: false,
        orders: true,
        finances: true,
        refresh_catalog: false,
    };

    /// Everything, without re-enriching known products.
    pub const FULL: Self = Self {
        products: true,
        orders: true,
        finances: true,
        refresh_catalog: false,
    };

    /// Everything, re-enriching known products from the catalog; the daily
    /// cadence.
    pub const REFRESH: Self = Self {
        products: true,
        orders: true,
        finances: true,
        refresh_catalog: true,
    };
}

/// What one run achieved for one account. A `None` pass was not selected or
/// did not complete.
#[derive(Debug, Default, Serialize)]
pub struct AccountSyncOutcome {
    pub products: Option<CatalogSyncSummary>,
    pub orders: Option<OrderSyncSummary>,
    pub finances: Option<FinanceSyncSummary>,
}

/// Runs sync passes for one account at a time.
///
/// Cloning is cheap; clones share the pool and the client cache.
#[derive(Clone)]
pub struct SyncService {
    pub(crate) pool: PgPool,
    pub(crate) clients: ClientManager,
}

impl SyncService {
    #[must_use]
    pub fn new(pool: PgPool, clients: ClientManager) -> Self {
        Self { pool, clients }
    }

    /// Load the account a sync was requested for.
    ///
    /// Disconnected accounts are refused: a manual opt-out means no sync
    /// work at all until the account is reconnected. Pending accounts pass,
    /// which is how a fresh account earns its first `connected` status.
    pub(crate) async fn sync_target(
        &self,
        account_id: AccountId,
    ) -> Result<MarketplaceAccount, SyncError> {
        let account = db::accounts::get_account(&self.pool, account_id)
            .await?
            .ok_or(SyncError::AccountNotFound(account_id))?;
        if account.status == ConnectionStatus::Disconnected {
            return Err(SyncError::AccountDisconnected(account_id));
        }
        Ok(account)
    }

    /// Run a selection for one account by id; the manual trigger path, also
    /// driven by ad hoc schedules.
    ///
    /// # Errors
    ///
    /// Returns the first pass error after all passes have settled and the
    /// account's status has been updated.
    pub async fn run_account(
        &self,
        account_id: AccountId,
        selection: SyncSelection,
    ) -> Result<AccountSyncOutcome, SyncError> {
        let account = self.sync_target(account_id).await?;
        self.run_selection(&account, selection).await
    }

    /// Run every pass for one account; the manual "sync everything" trigger.
    ///
    /// # Errors
    ///
    /// Returns the first pass error after all passes have settled and the
    /// account's status has been updated.
    pub async fn sync_all(&self, account_id: AccountId) -> Result<AccountSyncOutcome, SyncError> {
        self.run_account(account_id, SyncSelection::FULL).await
    }

    /// Run the selected passes concurrently and record the outcome.
    ///
    /// All selected passes always settle; one pass failing never cancels the
    /// others. Afterwards the account is marked `connected` or `error` and
    /// its sync timestamp is advanced regardless of outcome, so a repeatedly
    /// failing account still shows when it was last attempted.
    ///
    /// # Errors
    ///
    /// Returns the first pass error, or the storage error from recording the
    /// outcome.
    pub async fn run_selection(
        &self,
        account: &MarketplaceAccount,
        selection: SyncSelection,
    ) -> Result<AccountSyncOutcome, SyncError> {
        tracing::info!(
            account_id = %account.id,
            account_name = %account.name,
            ?selection,
            "starting sync run"
        );

        let products = async {
            if selection.products {
                Some(
                    self.sync_products_for(account, selection.refresh_catalog)
                        .await,
                )
            } else {
                None
            }
        };
        let orders = async {
            if selection.orders {
                Some(self.sync_orders_for(account).await)
            } else {
                None
            }
        };
        let finances = async {
            if selection.finances {
                Some(self.sync_finances_for(account).await)
            } else {
                None
            }
        };
        let (products, orders, finances) = tokio::join!(products, orders, finances);

        let mut first_error = None;
        let outcome = AccountSyncOutcome {
            products: settle(account.id, SyncKind::Products, products, &mut first_error),
            orders: settle(account.id, SyncKind::Orders, orders, &mut first_error),
            finances: settle(account.id, SyncKind::Finances, finances, &mut first_error),
        };

        let status = ConnectionStatus::after_sync(first_error.is_none());
        db::accounts::record_sync_outcome(&self.pool, account.id, status).await?;

        match first_error {
            None => {
                tracing::info!(account_id = %account.id, "sync run completed");
                Ok(outcome)
            }
            Some(error) => Err(error),
        }
    }
}

/// Collect one pass result, remembering the first failure.
fn settle<T>(
    account_id: AccountId,
    kind: SyncKind,
    result: Option<Result<T, SyncError>>,
    first_error: &mut Option<SyncError>,
) -> Option<T> {
    match result {
        Some(Ok(summary)) => Some(summary),
        Some(Err(error)) => {
            tracing::warn!(%account_id, %kind, %error, "sync pass failed");
            if first_error.is_none() {
                *first_error = Some(error);
            }
            None
        }
        None => None,
    }
}
