//! Ledger rows: append and filtered listing.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::instrument;

use storekeep_core::{ItemId, TransactionId};
use storekeep_inventory::{ItemRef, LedgerEntry, MovementMetadata, StockMovement, TransactionFilter, TxnType};

use crate::error::{StoreError, StoreResult, map_sqlx_error};
use crate::pattern::contains_pattern;
use crate::store::Store;

const DATE_FORMAT: &str = "%Y-%m-%d";

impl Store {
    /// Ledger rows matching `filter`, most recent effective date first.
    #[instrument(skip(self), err)]
    pub async fn list_transactions(&self, filter: &TransactionFilter) -> StoreResult<Vec<StockMovement>> {
        let name_pattern = contains_pattern(filter.name_contains.as_deref());
        let actor_pattern = contains_pattern(filter.actor_contains.as_deref());
        let category = filter
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let from = filter.date_range.map(|r| format_date(r.from()));
        let to = filter.date_range.map(|r| format_date(r.to()));

        let rows = sqlx::query(
            r#"
            SELECT
                txn_id,
                item_id,
                item_name,
                category,
                quantity,
                txn_type,
                txn_date,
                effective_date,
                user_name,
                bill_no,
                rate,
                gst,
                destination
            FROM transactions
            WHERE (?1 IS NULL OR item_name LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR user_name LIKE ?2 ESCAPE '\')
              AND (?3 IS NULL OR txn_type = ?3)
              AND (?4 IS NULL OR category = ?4)
              AND (?5 IS NULL OR item_id = ?5)
              AND (?6 IS NULL OR effective_date >= ?6)
              AND (?7 IS NULL OR effective_date <= ?7)
            ORDER BY effective_date DESC, txn_id DESC
            "#,
        )
        .bind(name_pattern)
        .bind(actor_pattern)
        .bind(filter.txn_type.map(|t| t.as_str()))
        .bind(category)
        .bind(filter.item_id.map(|id| id.get()))
        .bind(from)
        .bind(to)
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_transactions", e))?;

        rows.iter().map(row_to_movement).collect()
    }
}

/// Append one entry to the ledger and return its id.
pub(crate) async fn append(conn: &mut SqliteConnection, entry: &LedgerEntry) -> StoreResult<TransactionId> {
    let result = sqlx::query(
        r#"
        INSERT INTO transactions (
            item_id,
            item_name,
            category,
            quantity,
            txn_type,
            txn_date,
            effective_date,
            user_name,
            bill_no,
            rate,
            gst,
            destination
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(entry.item.item_id.get())
    .bind(&entry.item.item_name)
    .bind(&entry.item.category)
    .bind(i64::from(entry.quantity.get()))
    .bind(entry.txn_type.as_str())
    .bind(entry.recorded_at.to_rfc3339())
    .bind(format_date(entry.effective_date))
    .bind(&entry.actor)
    .bind(entry.metadata.bill_no.as_deref())
    .bind(entry.metadata.rate)
    .bind(entry.metadata.gst)
    .bind(entry.metadata.destination.as_deref())
    .execute(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("append_transaction", e))?;

    Ok(TransactionId::new(result.last_insert_rowid()))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn row_to_movement(row: &SqliteRow) -> StoreResult<StockMovement> {
    let get_err = |e: sqlx::Error| StoreError::corrupt("transactions", e.to_string());

    let txn_id: i64 = row.try_get("txn_id").map_err(get_err)?;
    let item_id: i64 = row.try_get("item_id").map_err(get_err)?;
    let item_name: String = row.try_get("item_name").map_err(get_err)?;
    let category: String = row.try_get("category").map_err(get_err)?;

    let quantity: i64 = row.try_get("quantity").map_err(get_err)?;
    let quantity = u32::try_from(quantity)
        .map_err(|_| StoreError::corrupt("transactions", format!("quantity {quantity} out of range")))?;

    let txn_type_str: String = row.try_get("txn_type").map_err(get_err)?;
    let txn_type = txn_type_str
        .parse::<TxnType>()
        .map_err(|e| StoreError::corrupt("transactions", e.to_string()))?;

    let recorded_str: String = row.try_get("txn_date").map_err(get_err)?;
    let recorded_at = DateTime::parse_from_rfc3339(&recorded_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::corrupt("transactions", format!("txn_date '{recorded_str}': {e}")))?;

    let effective_str: String = row.try_get("effective_date").map_err(get_err)?;
    let effective_date = NaiveDate::parse_from_str(&effective_str, DATE_FORMAT).map_err(|e| {
        StoreError::corrupt("transactions", format!("effective_date '{effective_str}': {e}"))
    })?;

    let actor: String = row.try_get("user_name").map_err(get_err)?;

    let metadata = MovementMetadata {
        bill_no: row.try_get("bill_no").map_err(get_err)?,
        rate: row.try_get("rate").map_err(get_err)?,
        gst: row.try_get("gst").map_err(get_err)?,
        destination: row.try_get("destination").map_err(get_err)?,
    };

    Ok(StockMovement {
        id: TransactionId::new(txn_id),
        item: ItemRef {
            item_id: ItemId::new(item_id),
            item_name,
            category,
        },
        txn_type,
        quantity,
        recorded_at,
        effective_date,
        actor,
        metadata,
    })
}
