//! `storekeep-desktop`
//!
//! **Responsibility:** the command layer a desktop front end talks to.
//!
//! This crate provides:
//! - Raw form parsing (text fields in, domain commands and filters out)
//! - `AppState` owning the store handle
//! - Async command handlers returning display-ready rows or a message string
//!
//! It has no widgets of its own; any UI shell can call the handlers in
//! [`commands`].

pub mod commands;
pub mod forms;
pub mod types;

pub use commands::AppState;
pub use forms::{IssueForm, ItemFilterForm, ReceiveForm, TransactionFilterForm};
pub use types::{AuditRow, AuditSummary, CategoryRow, ItemRow, MovementResult, TransactionRow};
