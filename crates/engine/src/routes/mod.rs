//! HTTP route handlers for the trigger API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (DB ping)
//!
//! # Accounts
//! POST   /accounts                      - Connect a marketplace account
//! GET    /accounts?owner_id=            - List an owner's accounts
//! GET    /accounts/{id}                 - Account detail
//! DELETE /accounts/{id}                 - Delete account (cascades)
//! POST   /accounts/{id}/reconnect       - Swap credentials and re-verify
//! GET    /accounts/{id}/listings        - Listings synced for the account
//! GET    /accounts/{id}/orders          - Orders ingested for the account
//! GET    /accounts/{id}/orders/{oid}    - One order with its line items
//! GET    /accounts/{id}/transactions    - Classified ledger lines
//!
//! # Sync triggers
//! POST /accounts/{id}/sync/products     - Reconcile remote inventory
//! POST /accounts/{id}/sync/orders       - Ingest recent orders
//! POST /accounts/{id}/sync/finances     - Ingest financial events
//! POST /accounts/{id}/sync/all          - All three passes, concurrently
//! PUT  /accounts/{id}/sync/schedule     - Register an ad hoc recurring schedule
//! DELETE /accounts/{id}/sync/schedule   - Cancel the ad hoc schedule
//!
//! # Products & costs
//! POST /products                        - Create a product
//! GET  /products?owner_id=              - List an owner's products
//! GET  /products/{id}                   - Product detail
//! POST /products/{id}/costs             - Append a cost version
//! GET  /products/{id}/costs             - Cost history
//! GET  /products/{id}/costs/current     - Cost in effect at ?as_of=
//! ```
//!
//! The health endpoints live in `main`; everything here rides on
//! [`AppState`]. There is no auth middleware: the trigger API is consumed by
//! a trusted dashboard layer that authenticates its own users.

pub mod accounts;
pub mod products;
pub mod sync;

use axum::Router;

use crate::state::AppState;

/// Create all routes for the trigger API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(accounts::router())
        .merge(sync::router())
        .merge(products::router())
}
