//! Database operations for the sync engine's `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `marketplace_accounts` - Seller connections and credentials
//! - `products` / `listings` - Internal catalog and its remote bindings
//! - `cost_versions` - Append-only cost history per product
//! - `sales_orders` / `sales_order_items` - Ingested orders
//! - `financial_transactions` - Classified financial ledger
//!
//! Queries use the runtime `sqlx` API with explicit row types; the schema
//! lives in `crates/engine/migrations/` and is applied via:
//! ```bash
//! cargo run -p sellerglass-cli -- migrate
//! ```

pub mod accounts;
pub mod costs;
pub mod listings;
pub mod orders;
pub mod products;
pub mod transactions;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate SKU, overlapping cost version).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
