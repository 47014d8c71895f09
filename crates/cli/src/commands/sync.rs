//! Manual sync trigger commands.
//!
//! # Usage
//!
//! ```bash
//! # Run every pass
//! sg-cli sync 7b0c8f1e-4a2d-4f3b-9c6e-5d1a2b3c4d5e
//!
//! # Orders and finances only
//! sg-cli sync 7b0c8f1e-4a2d-4f3b-9c6e-5d1a2b3c4d5e --orders --finances
//!
//! # Full catalog refresh, re-enriching known products
//! sg-cli sync 7b0c8f1e-4a2d-4f3b-9c6e-5d1a2b3c4d5e --products --refresh-catalog
//! ```
//!
//! # Environment Variables
//!
//! - `ENGINE_DATABASE_URL` - `PostgreSQL` connection string for the engine
//!   (falls back to `DATABASE_URL`)

use tracing::info;

use sellerglass_core::AccountId;
use sellerglass_engine::services::{ClientManager, SyncSelection, SyncService};

/// Run the selected sync passes for one account and report what happened.
///
/// # Errors
///
/// Returns an error if the account is unknown or disconnected, or if a
/// selected pass fails. Passes that finished before the failing one have
/// already persisted their work; rerunning is safe.
pub async fn run(
    account_id: AccountId,
    selection: SyncSelection,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::engine_pool().await?;
    let syncer = SyncService::new(pool.clone(), ClientManager::new(pool));

    info!(%account_id, ?selection, "Starting sync");
    let outcome = syncer.run_account(account_id, selection).await?;

    if let Some(products) = &outcome.products {
        info!(
            "Catalog: {} listed SKUs, {} known, {} products created",
            products.total, products.existing, products.created
        );
    }
    if let Some(orders) = &outcome.orders {
        info!(
            "Orders: {} fetched, {} created, {} already present, {} failed",
            orders.fetched, orders.created, orders.skipped, orders.failed
        );
    }
    if let Some(finances) = &outcome.finances {
        info!(
            "Finances: {} events, {} recorded, {} duplicates, {} empty",
            finances.fetched, finances.recorded, finances.duplicates, finances.empty
        );
    }

    info!("Sync complete");
    Ok(())
}
