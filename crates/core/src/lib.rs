//! SellerGlass Core - Shared types library.
//!
//! This crate provides common types used across all SellerGlass components:
//! - `engine` - Amazon SP-API synchronization engine
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, marketplace regions, connection statuses, and
//!   cost components

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
