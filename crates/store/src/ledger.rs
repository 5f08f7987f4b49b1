//! The ledger-update protocol.
//!
//! Receive and Issue each run in one store transaction:
//!
//! 1. resolve the item (creating it on a first receipt),
//! 2. let the item aggregate decide the ledger entry,
//! 3. append the entry and write the item's new quantity.
//!
//! The quantity write is conditional on the quantity read in step 1, so the
//! materialised total can never drift from the ledger even if another writer
//! slips in between.

use serde::Serialize;
use sqlx::{Sqlite, Transaction};
use tracing::{info, instrument, warn};

use storekeep_core::{Aggregate, DomainError};
use storekeep_inventory::{
    InventoryItem, IssueStock, LedgerEntry, ReceiveStock, StockCommand, StockMovement,
};

use crate::catalog;
use crate::error::{StoreResult, map_sqlx_error};
use crate::store::Store;
use crate::transactions;

/// Result of a successful receipt or issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementOutcome {
    /// The item after the movement.
    pub item: InventoryItem,
    /// The ledger row that was appended.
    pub movement: StockMovement,
    /// Whether the receipt created the item.
    pub created_item: bool,
}

impl MovementOutcome {
    pub fn new_quantity(&self) -> u32 {
        self.item.quantity()
    }
}

impl Store {
    /// Receive goods: add to the matching item (creating it if unseen) and
    /// append an `IN` row.
    #[instrument(
        skip(self, cmd),
        fields(name = %cmd.name, category = %cmd.category, quantity = cmd.quantity.get()),
        err
    )]
    pub async fn receive(&self, cmd: ReceiveStock) -> StoreResult<MovementOutcome> {
        let cmd = cmd.normalized()?;
        let key = self.revision().item_key(&cmd.name, &cmd.category);

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_receive", e))?;

        let (item, created_item) = match catalog::find_by_key(&mut tx, &key).await? {
            Some(item) => (item, false),
            None => (catalog::insert_item(&mut tx, &cmd.name, &cmd.category).await?, true),
        };

        let entries = match item.handle(&StockCommand::Receive(cmd)) {
            Ok(entries) => entries,
            Err(err) => {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(err.into());
            }
        };

        let outcome = record(&mut tx, item, entries, created_item).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_receive", e))?;

        info!(
            item_id = %outcome.item.id_typed(),
            txn_id = %outcome.movement.id,
            new_quantity = outcome.new_quantity(),
            created_item,
            "stock received"
        );
        Ok(outcome)
    }

    /// Issue goods out of an existing item and append an `OUT` row.
    ///
    /// Fails with `InsufficientStock` (and writes nothing) when more is
    /// requested than is on hand.
    #[instrument(
        skip(self, cmd),
        fields(item_id = %cmd.item_id, quantity = cmd.quantity.get()),
        err
    )]
    pub async fn issue(&self, cmd: IssueStock) -> StoreResult<MovementOutcome> {
        let cmd = cmd.normalized()?;

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_issue", e))?;

        let item = match catalog::load_item(&mut tx, cmd.item_id).await? {
            Some(item) => item,
            None => {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(DomainError::not_found().into());
            }
        };

        let entries = match item.handle(&StockCommand::Issue(cmd)) {
            Ok(entries) => entries,
            Err(err) => {
                if let DomainError::InsufficientStock { requested, available } = &err {
                    warn!(requested, available, "issue rejected: insufficient stock");
                }
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(err.into());
            }
        };

        let outcome = record(&mut tx, item, entries, false).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_issue", e))?;

        info!(
            item_id = %outcome.item.id_typed(),
            txn_id = %outcome.movement.id,
            new_quantity = outcome.new_quantity(),
            "stock issued"
        );
        Ok(outcome)
    }
}

/// Apply the decided entries to the item, append them, and persist the item.
async fn record(
    tx: &mut Transaction<'_, Sqlite>,
    mut item: InventoryItem,
    entries: Vec<LedgerEntry>,
    created_item: bool,
) -> StoreResult<MovementOutcome> {
    let expected_quantity = item.quantity();

    let mut last = None;
    for entry in entries {
        item.apply(&entry);
        let id = transactions::append(&mut **tx, &entry).await?;
        last = Some(StockMovement::from_entry(id, entry));
    }
    let movement = last.ok_or_else(|| DomainError::invariant("no ledger entry decided"))?;

    catalog::store_item_state(&mut **tx, &item, expected_quantity).await?;

    Ok(MovementOutcome {
        item,
        movement,
        created_item,
    })
}
