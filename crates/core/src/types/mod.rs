//! Core types for SellerGlass.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cost;
pub mod id;
pub mod region;
pub mod status;

pub use cost::CostComponents;
pub use id::*;
pub use region::{ParseRegionError, Region};
pub use status::*;
