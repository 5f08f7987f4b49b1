//! Inventory domain module.
//!
//! This crate contains the business rules for the stock ledger, implemented
//! purely as deterministic domain logic (no IO, no SQL, no storage).

pub mod category;
pub mod filter;
pub mod item;
pub mod movement;
pub mod replay;

pub use category::{Category, normalize_category_name};
pub use filter::{DateRange, ItemFilter, TransactionFilter};
pub use item::{
    CatalogRevision, InventoryItem, IssueStock, ItemKey, ReceiveStock, StockCommand,
};
pub use movement::{ItemRef, LedgerEntry, MovementMetadata, Quantity, StockMovement, TxnType};
pub use replay::StockBalances;
