//! SQLite persistence for the stock ledger.
//!
//! The store owns three tables (`categories`, `inventory`, `transactions`)
//! and is the only writer of item quantities. Receive and Issue go through
//! [`Store::receive`] and [`Store::issue`], which append a ledger row and
//! update the item's quantity atomically.

mod audit;
mod catalog;
pub mod config;
mod error;
mod ledger;
mod pattern;
mod schema;
mod store;
mod transactions;

#[cfg(test)]
mod test_support;

pub use audit::{AuditReport, Discrepancy};
pub use config::{DatabaseLocation, StoreConfig, default_database_path};
pub use error::{StoreError, StoreResult};
pub use ledger::MovementOutcome;
pub use store::Store;
