//! Integration tests for SellerGlass.
//!
//! # Running Tests
//!
//! ```bash
//! # Pure tests (payload shapes, sync selection, error classification)
//! cargo test -p sellerglass-integration-tests
//!
//! # Database-backed ledger tests (need a migrated PostgreSQL)
//! cargo run -p sellerglass-cli -- migrate
//! cargo test -p sellerglass-integration-tests -- --ignored engine_cost_ledger
//!
//! # HTTP tests (need a running engine on ENGINE_BASE_URL)
//! cargo run -p sellerglass-engine &
//! cargo test -p sellerglass-integration-tests -- --ignored engine_api
//! ```
//!
//! # Test Categories
//!
//! - `engine_sync` - Sync selection cadences and failure classification
//! - `engine_payloads` - JSON shapes of the trigger API's inputs and outputs
//! - `engine_cost_ledger` - Append-only cost ledger against a live database
//! - `engine_order_ingestion` - Order ingestion atomicity and idempotency
//!   against a live database, remote endpoints served by `wiremock`
//! - `engine_cycle_isolation` - Per-account failure isolation in scheduled
//!   cycles, same setup
//! - `engine_api` - Trigger API against a running engine
