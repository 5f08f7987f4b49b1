//! Replaying ledger rows into per-item balances.
//!
//! Balances are disposable and can always be rebuilt from the ledger.

use std::collections::BTreeMap;

use storekeep_core::ItemId;

use crate::movement::StockMovement;

/// Running Σ IN − Σ OUT per item id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockBalances {
    balances: BTreeMap<ItemId, i64>,
}

impl StockBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild balances from scratch.
    pub fn rebuild_from_scratch<'a>(movements: impl IntoIterator<Item = &'a StockMovement>) -> Self {
        let mut balances = Self::new();
        for movement in movements {
            balances.apply(movement);
        }
        balances
    }

    pub fn apply(&mut self, movement: &StockMovement) {
        *self.balances.entry(movement.item.item_id).or_insert(0) += movement.signed_delta();
    }

    /// Balance for one item; zero if it never moved.
    pub fn balance(&self, item_id: ItemId) -> i64 {
        self.balances.get(&item_id).copied().unwrap_or(0)
    }

    /// Items whose balance is negative. Empty for any ledger produced by
    /// the Receive/Issue protocol.
    pub fn overdrawn(&self) -> impl Iterator<Item = (ItemId, i64)> + '_ {
        self.iter().filter(|(_, balance)| *balance < 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, i64)> + '_ {
        self.balances.iter().map(|(id, balance)| (*id, *balance))
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}
