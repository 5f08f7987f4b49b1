//! Display rows returned to the front end.
//!
//! Everything here is plain data with string-friendly fields so a table
//! widget can render it without knowing the domain types.

use serde::{Deserialize, Serialize};

use storekeep_inventory::{Category, InventoryItem, StockMovement};
use storekeep_store::{AuditReport, Discrepancy, MovementOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
}

impl From<Category> for CategoryRow {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.get(),
            name: category.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub quantity: u32,
}

impl From<InventoryItem> for ItemRow {
    fn from(item: InventoryItem) -> Self {
        Self {
            id: item.id_typed().get(),
            name: item.name().to_string(),
            category: item.category().to_string(),
            quantity: item.quantity(),
        }
    }
}

/// One ledger row as shown in the transactions table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub category: String,
    pub quantity: u32,
    /// `IN` or `OUT`.
    pub txn_type: String,
    /// Effective date, `YYYY-MM-DD`.
    pub date: String,
    /// Recording timestamp, RFC 3339.
    pub recorded_at: String,
    pub user_name: String,
    pub bill_no: Option<String>,
    pub rate: Option<f64>,
    pub gst: Option<f64>,
    pub destination: Option<String>,
}

impl From<StockMovement> for TransactionRow {
    fn from(m: StockMovement) -> Self {
        Self {
            id: m.id.get(),
            item_id: m.item.item_id.get(),
            item_name: m.item.item_name,
            category: m.item.category,
            quantity: m.quantity,
            txn_type: m.txn_type.as_str().to_string(),
            date: m.effective_date.format("%Y-%m-%d").to_string(),
            recorded_at: m.recorded_at.to_rfc3339(),
            user_name: m.actor,
            bill_no: m.metadata.bill_no,
            rate: m.metadata.rate,
            gst: m.metadata.gst,
            destination: m.metadata.destination,
        }
    }
}

/// What the operator sees after a receipt or issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementResult {
    pub item: ItemRow,
    pub transaction: TransactionRow,
    pub new_quantity: u32,
    pub created_item: bool,
    pub message: String,
}

impl From<MovementOutcome> for MovementResult {
    fn from(outcome: MovementOutcome) -> Self {
        let new_quantity = outcome.new_quantity();
        let verb = match outcome.movement.txn_type {
            storekeep_inventory::TxnType::In => "Received",
            storekeep_inventory::TxnType::Out => "Issued",
        };
        let message = format!(
            "{verb} {} x {}. New quantity: {new_quantity}",
            outcome.movement.quantity,
            outcome.item.name()
        );
        Self {
            item: outcome.item.into(),
            transaction: outcome.movement.into(),
            new_quantity,
            created_item: outcome.created_item,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRow {
    pub item_id: i64,
    pub item_name: String,
    pub stored_quantity: Option<i64>,
    pub ledger_quantity: i64,
}

impl From<Discrepancy> for AuditRow {
    fn from(d: Discrepancy) -> Self {
        Self {
            item_id: d.item_id.get(),
            item_name: d.item_name,
            stored_quantity: d.stored_quantity,
            ledger_quantity: d.ledger_quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub items_checked: u64,
    pub consistent: bool,
    pub discrepancies: Vec<AuditRow>,
}

impl From<AuditReport> for AuditSummary {
    fn from(report: AuditReport) -> Self {
        Self {
            items_checked: report.items_checked,
            consistent: report.is_consistent(),
            discrepancies: report.discrepancies.into_iter().map(Into::into).collect(),
        }
    }
}
