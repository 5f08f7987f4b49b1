//! Ledger audit: recompute every item's balance from its ledger rows and
//! compare it with the stored quantity.

use serde::Serialize;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::{instrument, warn};

use storekeep_core::ItemId;

use crate::error::{StoreError, StoreResult, map_sqlx_error};
use crate::store::Store;

/// One item whose stored quantity disagrees with its ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub item_id: ItemId,
    pub item_name: String,
    /// `None` when ledger rows reference an item that no longer exists.
    pub stored_quantity: Option<i64>,
    /// Σ IN − Σ OUT over the item's ledger rows.
    pub ledger_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub items_checked: u64,
    pub discrepancies: Vec<Discrepancy>,
}

impl AuditReport {
    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

impl Store {
    /// Check that every item's quantity equals the signed sum of its ledger rows.
    #[instrument(skip(self), err)]
    pub async fn audit(&self) -> StoreResult<AuditReport> {
        let mut conn = self
            .pool()
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire", e))?;

        let items_checked: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory")
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("count_items", e))?;

        let rows = sqlx::query(
            r#"
            WITH ledger AS (
                SELECT
                    item_id,
                    MAX(item_name) AS item_name,
                    SUM(CASE txn_type WHEN 'IN' THEN quantity ELSE -quantity END) AS balance
                FROM transactions
                GROUP BY item_id
            )
            SELECT
                i.item_id AS item_id,
                i.item_name AS item_name,
                i.quantity AS stored_quantity,
                COALESCE(l.balance, 0) AS ledger_quantity
            FROM inventory i
            LEFT JOIN ledger l ON l.item_id = i.item_id
            WHERE i.quantity <> COALESCE(l.balance, 0)
            UNION ALL
            SELECT
                l.item_id,
                l.item_name,
                NULL,
                l.balance
            FROM ledger l
            WHERE l.balance <> 0
              AND NOT EXISTS (SELECT 1 FROM inventory i WHERE i.item_id = l.item_id)
            ORDER BY item_id
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("audit_ledger", e))?;

        let discrepancies = rows.iter().map(row_to_discrepancy).collect::<StoreResult<Vec<_>>>()?;
        for d in &discrepancies {
            warn!(
                item_id = %d.item_id,
                item_name = %d.item_name,
                stored = ?d.stored_quantity,
                ledger = d.ledger_quantity,
                "ledger and stored quantity disagree"
            );
        }

        Ok(AuditReport {
            items_checked: u64::try_from(items_checked).unwrap_or_default(),
            discrepancies,
        })
    }
}

fn row_to_discrepancy(row: &SqliteRow) -> StoreResult<Discrepancy> {
    let get_err = |e: sqlx::Error| StoreError::corrupt("transactions", e.to_string());
    Ok(Discrepancy {
        item_id: ItemId::new(row.try_get("item_id").map_err(get_err)?),
        item_name: row.try_get("item_name").map_err(get_err)?,
        stored_quantity: row.try_get("stored_quantity").map_err(get_err)?,
        ledger_quantity: row.try_get("ledger_quantity").map_err(get_err)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day, issue, memory_store, receipt};
    use storekeep_core::DomainError;
    use storekeep_inventory::CatalogRevision;

    #[tokio::test]
    async fn empty_store_is_consistent() {
        let store = memory_store(CatalogRevision::NameCategoryKeyed).await;
        let report = store.audit().await.unwrap();
        assert_eq!(report.items_checked, 0);
        assert!(report.is_consistent());
    }

    #[tokio::test]
    async fn normal_traffic_keeps_the_ledger_balanced() {
        let store = memory_store(CatalogRevision::NameCategoryKeyed).await;
        let pen = store
            .receive(receipt("Pen", "Stationery", 100, "Alice", day(2024, 1, 1)))
            .await
            .unwrap();
        store
            .receive(receipt("Stapler", "Office", 4, "Alice", day(2024, 1, 1)))
            .await
            .unwrap();
        store
            .issue(issue(pen.item.id_typed(), 30, "Bob", "RoomA", day(2024, 1, 2)))
            .await
            .unwrap();
        let rejected = store
            .issue(issue(pen.item.id_typed(), 500, "Bob", "RoomA", day(2024, 1, 2)))
            .await
            .unwrap_err();
        assert_eq!(
            rejected.domain(),
            Some(&DomainError::insufficient_stock(500, 70))
        );

        let report = store.audit().await.unwrap();
        assert_eq!(report.items_checked, 2);
        assert!(report.is_consistent(), "{report:?}");
    }

    #[tokio::test]
    async fn tampered_quantity_and_orphan_rows_are_reported() {
        let store = memory_store(CatalogRevision::NameCategoryKeyed).await;
        let pen = store
            .receive(receipt("Pen", "Stationery", 10, "Alice", day(2024, 1, 1)))
            .await
            .unwrap();

        sqlx::query("UPDATE inventory SET quantity = 7 WHERE item_id = ?1")
            .bind(pen.item.id_typed().get())
            .execute(store.pool())
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO transactions (item_id, item_name, category, quantity, txn_type, txn_date, effective_date, user_name) \
             VALUES (42, 'Ghost', 'Misc', 3, 'IN', '2024-01-01T00:00:00+00:00', '2024-01-01', 'Alice')",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let report = store.audit().await.unwrap();
        assert_eq!(
            report.discrepancies,
            vec![
                Discrepancy {
                    item_id: pen.item.id_typed(),
                    item_name: "Pen".into(),
                    stored_quantity: Some(7),
                    ledger_quantity: 10,
                },
                Discrepancy {
                    item_id: ItemId::new(42),
                    item_name: "Ghost".into(),
                    stored_quantity: None,
                    ledger_quantity: 3,
                },
            ]
        );
    }
}
