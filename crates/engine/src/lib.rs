//! SellerGlass engine library.
//!
//! Multi-tenant sync engine between Amazon SP-API marketplace accounts and
//! the local profitability database: catalog reconciliation, order
//! ingestion, financial event classification and the append-only cost
//! ledger, driven by recurring scheduler cadences and a thin JSON trigger
//! API.
//!
//! The binary in `main.rs` is a thin shell over this crate so the CLI and
//! the integration tests can drive the same code paths.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod spapi;
pub mod state;
