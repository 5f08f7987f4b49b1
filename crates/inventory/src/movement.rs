//! Ledger entries: the append-only record of stock movements.

use chrono::{DateTime, NaiveDate, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use storekeep_core::{DomainError, DomainResult, Entity, ItemId, TransactionId, ValueObject};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxnType {
    /// Goods received.
    #[serde(rename = "IN")]
    In,
    /// Goods issued.
    #[serde(rename = "OUT")]
    Out,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnType::In => "IN",
            TxnType::Out => "OUT",
        }
    }

    /// Sign applied to a magnitude when folding the ledger.
    pub fn sign(&self) -> i64 {
        match self {
            TxnType::In => 1,
            TxnType::Out => -1,
        }
    }
}

impl core::fmt::Display for TxnType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxnType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(TxnType::In),
            "OUT" => Ok(TxnType::Out),
            other => Err(DomainError::validation(format!(
                "transaction type must be IN or OUT, got '{other}'"
            ))),
        }
    }
}

/// Magnitude of a single movement. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> DomainResult<Self> {
        if value == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl ValueObject for Quantity {}

impl TryFrom<u32> for Quantity {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

/// Optional movement details. Receipts carry bill/rate/GST, issues carry a
/// destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementMetadata {
    pub bill_no: Option<String>,
    /// Unit rate.
    pub rate: Option<f64>,
    /// GST percentage.
    pub gst: Option<f64>,
    pub destination: Option<String>,
}

impl ValueObject for MovementMetadata {}

impl MovementMetadata {
    pub fn receipt(bill_no: Option<String>, rate: Option<f64>, gst: Option<f64>) -> Self {
        Self {
            bill_no,
            rate,
            gst,
            destination: None,
        }
    }

    pub fn issue(destination: Option<String>) -> Self {
        Self {
            destination,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> DomainResult<()> {
        if let Some(rate) = self.rate {
            if !rate.is_finite() || rate < 0.0 {
                return Err(DomainError::validation("rate must be a non-negative number"));
            }
        }
        if let Some(gst) = self.gst {
            if !gst.is_finite() || !(0.0..=100.0).contains(&gst) {
                return Err(DomainError::validation("GST must be between 0 and 100 percent"));
            }
        }
        Ok(())
    }
}

/// Snapshot of the item a movement was recorded against.
///
/// Name and category are copied at write time so the ledger still reads
/// correctly after the item is renamed, recategorised or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub item_id: ItemId,
    pub item_name: String,
    pub category: String,
}

/// A movement decided by the item aggregate, not yet written to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub item: ItemRef,
    pub txn_type: TxnType,
    pub quantity: Quantity,
    pub actor: String,
    pub recorded_at: DateTime<Utc>,
    pub effective_date: NaiveDate,
    pub metadata: MovementMetadata,
}

impl LedgerEntry {
    pub fn signed_delta(&self) -> i64 {
        self.txn_type.sign() * i64::from(self.quantity.get())
    }
}

/// A movement as stored in the ledger. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: TransactionId,
    pub item: ItemRef,
    pub txn_type: TxnType,
    pub quantity: u32,
    pub recorded_at: DateTime<Utc>,
    pub effective_date: NaiveDate,
    pub actor: String,
    pub metadata: MovementMetadata,
}

impl StockMovement {
    /// Build the stored form of an entry once the store has assigned its id.
    pub fn from_entry(id: TransactionId, entry: LedgerEntry) -> Self {
        Self {
            id,
            item: entry.item,
            txn_type: entry.txn_type,
            quantity: entry.quantity.get(),
            recorded_at: entry.recorded_at,
            effective_date: entry.effective_date,
            actor: entry.actor,
            metadata: entry.metadata,
        }
    }

    pub fn signed_delta(&self) -> i64 {
        self.txn_type.sign() * i64::from(self.quantity)
    }
}

impl Entity for StockMovement {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
