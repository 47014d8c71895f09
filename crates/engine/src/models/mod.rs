//! Domain models backing the sync engine.
//!
//! Each aggregate gets its own module: the persisted struct, the row type it
//! is loaded from when the two differ (credentials are wrapped in
//! [`secrecy::SecretString`] on the way out of the database), and the input
//! struct used to create it.

pub mod account;
pub mod cost;
pub mod listing;
pub mod order;
pub mod product;
pub mod transaction;

pub use account::{MarketplaceAccount, NewAccount};
pub use cost::{CostVersion, NewCostVersion};
pub use listing::{Listing, ListingUpsert};
pub use order::{NewSalesOrder, NewSalesOrderItem, SalesOrder, SalesOrderItem};
pub use product::{NewProduct, Product};
pub use transaction::{FinancialTransaction, NewFinancialTransaction};
