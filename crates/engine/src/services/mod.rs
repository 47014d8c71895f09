//! Synchronization services.
//!
//! The engine's moving parts, layered over [`crate::db`] and [`crate::spapi`]:
//!
//! - [`clients`] - per-account SP-API client cache
//! - [`sync`] - the [`SyncService`] facade driving one account's sync work
//! - [`catalog`] - inventory-to-product reconciliation (`sync_products`)
//! - [`orders`] - settled-order ingestion (`sync_orders`)
//! - [`finances`] - financial-event classification (`sync_finances`)
//! - [`accounts`] - account connect/verify/reconnect/delete lifecycle
//! - [`scheduler`] - recurring cycles across all sync-eligible accounts
//!
//! The cost version ledger has no service wrapper: its close-then-insert
//! transaction lives in [`crate::db::costs`] and is consumed directly by the
//! routes.

pub mod accounts;
pub mod catalog;
pub mod clients;
pub mod finances;
pub mod orders;
pub mod scheduler;
pub mod sync;

pub use accounts::AccountService;
pub use catalog::CatalogSyncSummary;
pub use clients::{ClientManager, EndpointOverride};
pub use finances::FinanceSyncSummary;
pub use orders::OrderSyncSummary;
pub use scheduler::SyncScheduler;
pub use sync::{AccountSyncOutcome, SyncSelection, SyncService};

use sellerglass_core::AccountId;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::spapi::SpApiError;

/// How far back order and financial-event ingestion look on every run.
///
/// The window is fixed rather than tracked per account: idempotent inserts
/// make overlapping re-runs safe, and a fixed window self-heals gaps left by
/// failed cycles.
pub const SYNC_WINDOW_DAYS: i64 = 30;

/// Errors from the sync engine's services.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Account id does not exist.
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    /// Account exists but belongs to a different owner.
    #[error("account {0} does not belong to the requesting owner")]
    OwnerMismatch(AccountId),

    /// Account was manually disconnected and must be reconnected first.
    #[error("account {0} is disconnected; reconnect it before syncing")]
    AccountDisconnected(AccountId),

    /// Credentials work but the marketplace is not among the seller's
    /// participations.
    #[error("marketplace {0} is not accessible with these credentials")]
    MarketplaceNotAccessible(String),

    /// SP-API or token-endpoint failure.
    #[error(transparent)]
    SpApi(#[from] SpApiError),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SyncError {
    /// Whether the account's credentials are bad and the whole cycle should
    /// fail fast.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::SpApi(e) if e.is_auth_failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_classification() {
        let err = SyncError::SpApi(SpApiError::AuthenticationFailed("revoked".to_string()));
        assert!(err.is_auth_failure());

        let err = SyncError::SpApi(SpApiError::RateLimited(30));
        assert!(!err.is_auth_failure());

        let err = SyncError::AccountNotFound(AccountId::generate());
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn test_error_display() {
        let id = AccountId::generate();
        let err = SyncError::AccountDisconnected(id);
        assert_eq!(
            err.to_string(),
            format!("account {id} is disconnected; reconnect it before syncing")
        );
    }
}
