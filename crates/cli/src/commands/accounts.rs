//! Marketplace account management commands.
//!
//! # Usage
//!
//! ```bash
//! # List every account, or one owner's accounts
//! sg-cli accounts list
//! sg-cli accounts list -o 1e0a4c6b-9f2d-4e3a-8b7c-6d5e4f3a2b1c
//!
//! # Opt an account out of syncing without deleting its data
//! sg-cli accounts disconnect 7b0c8f1e-4a2d-4f3b-9c6e-5d1a2b3c4d5e
//!
//! # Delete an account; synced orders, listings and ledger lines go with it
//! sg-cli accounts delete 7b0c8f1e-4a2d-4f3b-9c6e-5d1a2b3c4d5e
//! ```
//!
//! # Environment Variables
//!
//! - `ENGINE_DATABASE_URL` - `PostgreSQL` connection string for the engine
//!   (falls back to `DATABASE_URL`)

use tracing::{info, warn};

use sellerglass_core::{AccountId, OwnerId};
use sellerglass_engine::db;
use sellerglass_engine::services::{AccountService, ClientManager};

/// List marketplace accounts, optionally filtered to one owner.
///
/// # Errors
///
/// Returns an error if the database connection or query fails.
pub async fn list(owner: Option<OwnerId>) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::engine_pool().await?;

    let accounts = match owner {
        Some(owner_id) => db::accounts::list_accounts_by_owner(&pool, owner_id).await?,
        None => db::accounts::list_all_accounts(&pool).await?,
    };

    if accounts.is_empty() {
        info!("No accounts found");
        return Ok(());
    }

    info!("{} account(s):", accounts.len());
    for account in accounts {
        info!(
            "  {}  {:<24}  {}  {:<12}  last sync: {}",
            account.id,
            account.name,
            account.region,
            account.status.to_string(),
            account
                .last_synced_at
                .map_or_else(|| "never".to_owned(), |at| at.to_rfc3339()),
        );
    }

    Ok(())
}

/// Mark an account disconnected so syncs skip it.
///
/// # Errors
///
/// Returns an error if the account does not exist or the update fails.
pub async fn disconnect(account_id: AccountId) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::engine_pool().await?;
    let accounts = AccountService::new(pool.clone(), ClientManager::new(pool));

    accounts.disconnect(account_id).await?;

    info!("Account {account_id} disconnected; syncs will skip it until it is reconnected");
    Ok(())
}

/// Delete an account and everything synced for it.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn delete(account_id: AccountId) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::engine_pool().await?;
    let accounts = AccountService::new(pool.clone(), ClientManager::new(pool));

    if accounts.delete(account_id).await? {
        info!("Account {account_id} deleted");
    } else {
        warn!("Account {account_id} not found");
    }
    Ok(())
}
