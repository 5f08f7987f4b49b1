//! On-disk schema. This is the durable contract across restarts.

use sqlx::SqlitePool;
use tracing::info;

use storekeep_inventory::CatalogRevision;

use crate::error::{StoreError, StoreResult, map_sqlx_error};

const REVISION_KEY: &str = "catalog_revision";

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS store_meta (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        category_id   INTEGER PRIMARY KEY AUTOINCREMENT,
        category_name TEXT UNIQUE NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        item_id   INTEGER PRIMARY KEY AUTOINCREMENT,
        item_name TEXT NOT NULL,
        category  TEXT NOT NULL,
        quantity  INTEGER NOT NULL CHECK (quantity >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        txn_id         INTEGER PRIMARY KEY AUTOINCREMENT,
        item_id        INTEGER NOT NULL,
        item_name      TEXT NOT NULL,
        category       TEXT NOT NULL,
        quantity       INTEGER NOT NULL CHECK (quantity > 0),
        txn_type       TEXT NOT NULL CHECK (txn_type IN ('IN', 'OUT')),
        txn_date       TEXT NOT NULL,
        effective_date TEXT NOT NULL,
        user_name      TEXT NOT NULL,
        bill_no        TEXT NULL,
        rate           REAL NULL,
        gst            REAL NULL,
        destination    TEXT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS transactions_effective_date ON transactions (effective_date)",
    "CREATE INDEX IF NOT EXISTS transactions_item_id ON transactions (item_id)",
];

fn item_key_index(revision: CatalogRevision) -> &'static str {
    match revision {
        CatalogRevision::NameKeyed => {
            "CREATE UNIQUE INDEX IF NOT EXISTS inventory_name_key ON inventory (item_name)"
        }
        CatalogRevision::NameCategoryKeyed => {
            "CREATE UNIQUE INDEX IF NOT EXISTS inventory_name_category_key ON inventory (item_name, category)"
        }
    }
}

/// Create missing tables and pin the catalog revision the file was created with.
pub(crate) async fn migrate(pool: &SqlitePool, revision: CatalogRevision) -> StoreResult<()> {
    for ddl in TABLES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("create_schema", e))?;
    }

    let existing: Option<String> =
        sqlx::query_scalar::<_, String>("SELECT value FROM store_meta WHERE key = ?1")
            .bind(REVISION_KEY)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_sqlx_error("read_revision", e))?;

    match existing {
        Some(stored) if stored != revision.as_str() => {
            return Err(StoreError::Config(format!(
                "database was created with catalog revision '{stored}', refusing to open it as '{revision}'"
            )));
        }
        Some(_) => {}
        None => {
            sqlx::query("INSERT INTO store_meta (key, value) VALUES (?1, ?2)")
                .bind(REVISION_KEY)
                .bind(revision.as_str())
                .execute(pool)
                .await
                .map_err(|e| map_sqlx_error("write_revision", e))?;
            info!(revision = %revision, "initialised new inventory store");
        }
    }

    sqlx::query(item_key_index(revision))
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("create_item_key_index", e))?;

    Ok(())
}
