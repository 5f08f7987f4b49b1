//! Catalog: categories and items with their on-hand quantity.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::{info, instrument};

use storekeep_core::{CategoryId, DomainError, ItemId};
use storekeep_inventory::{Category, InventoryItem, ItemFilter, ItemKey, normalize_category_name};

use crate::error::{StoreError, StoreResult, is_unique_violation, map_sqlx_error};
use crate::pattern::contains_pattern;
use crate::store::Store;

impl Store {
    /// Add a category. Names are trimmed and must be unique.
    #[instrument(skip(self), err)]
    pub async fn add_category(&self, name: &str) -> StoreResult<Category> {
        let name = normalize_category_name(name)?;

        let result = sqlx::query("INSERT INTO categories (category_name) VALUES (?1)")
            .bind(&name)
            .execute(self.pool())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::from(DomainError::duplicate_category(name.clone()))
                } else {
                    map_sqlx_error("insert_category", e)
                }
            })?;

        let category = Category {
            id: CategoryId::new(result.last_insert_rowid()),
            name,
        };
        info!(category_id = %category.id, name = %category.name, "category added");
        Ok(category)
    }

    /// Delete a category row and return it.
    ///
    /// Items and ledger rows keep referencing the name; nothing cascades.
    #[instrument(skip(self), err)]
    pub async fn delete_category(&self, id: CategoryId) -> StoreResult<Category> {
        let row = sqlx::query(
            r#"
            DELETE FROM categories
            WHERE category_id = ?1
            RETURNING category_id, category_name
            "#,
        )
        .bind(id.get())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("delete_category", e))?;

        let category = match row {
            Some(row) => row_to_category(&row)?,
            None => return Err(DomainError::not_found().into()),
        };
        info!(category_id = %category.id, name = %category.name, "category deleted");
        Ok(category)
    }

    /// All categories in creation order.
    pub async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT category_id, category_name
            FROM categories
            ORDER BY category_id ASC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_categories", e))?;

        rows.iter().map(row_to_category).collect()
    }

    /// Category names only, in creation order (for option lists).
    pub async fn category_names(&self) -> StoreResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT category_name FROM categories ORDER BY category_id ASC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("category_names", e))
    }

    pub async fn get_item(&self, id: ItemId) -> StoreResult<Option<InventoryItem>> {
        let mut conn = self
            .pool()
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire", e))?;
        load_item(&mut conn, id).await
    }

    /// Look an item up the same way a receipt would resolve it.
    pub async fn find_item(&self, name: &str, category: &str) -> StoreResult<Option<InventoryItem>> {
        let key = self.revision().item_key(name.trim(), category.trim());
        let mut conn = self
            .pool()
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire", e))?;
        find_by_key(&mut conn, &key).await
    }

    /// Items whose name contains `filter.name_contains`, optionally restricted
    /// to one category, ordered by id.
    #[instrument(skip(self), err)]
    pub async fn list_items(&self, filter: &ItemFilter) -> StoreResult<Vec<InventoryItem>> {
        let name_pattern = contains_pattern(filter.name_contains.as_deref());
        let category = filter
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let rows = sqlx::query(
            r#"
            SELECT item_id, item_name, category, quantity
            FROM inventory
            WHERE (?1 IS NULL OR item_name LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR category = ?2)
            ORDER BY item_id ASC
            "#,
        )
        .bind(name_pattern)
        .bind(category)
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;

        rows.iter().map(row_to_item).collect()
    }
}

pub(crate) async fn load_item(
    conn: &mut SqliteConnection,
    id: ItemId,
) -> StoreResult<Option<InventoryItem>> {
    let row = sqlx::query(
        r#"
        SELECT item_id, item_name, category, quantity
        FROM inventory
        WHERE item_id = ?1
        "#,
    )
    .bind(id.get())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("load_item", e))?;

    row.as_ref().map(row_to_item).transpose()
}

pub(crate) async fn find_by_key(
    conn: &mut SqliteConnection,
    key: &ItemKey,
) -> StoreResult<Option<InventoryItem>> {
    let row = sqlx::query(
        r#"
        SELECT item_id, item_name, category, quantity
        FROM inventory
        WHERE item_name = ?1
          AND (?2 IS NULL OR category = ?2)
        "#,
    )
    .bind(&key.name)
    .bind(key.category.as_deref())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("find_item_by_key", e))?;

    row.as_ref().map(row_to_item).transpose()
}

/// Insert a new item with nothing on hand. Its stock arrives through the ledger.
pub(crate) async fn insert_item(
    conn: &mut SqliteConnection,
    name: &str,
    category: &str,
) -> StoreResult<InventoryItem> {
    let result = sqlx::query(
        "INSERT INTO inventory (item_name, category, quantity) VALUES (?1, ?2, 0)",
    )
    .bind(name)
    .bind(category)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("insert_item", e))?;

    Ok(InventoryItem::new(
        ItemId::new(result.last_insert_rowid()),
        name,
        category,
        0,
    ))
}

/// Write the item's evolved state, provided its quantity is still the one we read.
pub(crate) async fn store_item_state(
    conn: &mut SqliteConnection,
    item: &InventoryItem,
    expected_quantity: u32,
) -> StoreResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE inventory
        SET quantity = ?1,
            category = ?2
        WHERE item_id = ?3
          AND quantity = ?4
        "#,
    )
    .bind(i64::from(item.quantity()))
    .bind(item.category())
    .bind(item.id_typed().get())
    .bind(i64::from(expected_quantity))
    .execute(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("update_item_quantity", e))?;

    if result.rows_affected() == 0 {
        return Err(DomainError::conflict(format!(
            "quantity of item {} changed while recording a movement",
            item.id_typed()
        ))
        .into());
    }
    Ok(())
}

fn row_to_category(row: &SqliteRow) -> StoreResult<Category> {
    let id: i64 = row
        .try_get("category_id")
        .map_err(|e| StoreError::corrupt("categories", e.to_string()))?;
    let name: String = row
        .try_get("category_name")
        .map_err(|e| StoreError::corrupt("categories", e.to_string()))?;
    Ok(Category {
        id: CategoryId::new(id),
        name,
    })
}

fn row_to_item(row: &SqliteRow) -> StoreResult<InventoryItem> {
    let get_err = |e: sqlx::Error| StoreError::corrupt("inventory", e.to_string());

    let id: i64 = row.try_get("item_id").map_err(get_err)?;
    let name: String = row.try_get("item_name").map_err(get_err)?;
    let category: String = row.try_get("category").map_err(get_err)?;
    let quantity: i64 = row.try_get("quantity").map_err(get_err)?;
    let quantity = u32::try_from(quantity)
        .map_err(|_| StoreError::corrupt("inventory", format!("quantity {quantity} out of range")))?;

    Ok(InventoryItem::new(ItemId::new(id), name, category, quantity))
}
