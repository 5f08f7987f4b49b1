//! The store handle.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, instrument};

use storekeep_inventory::CatalogRevision;

use crate::config::{DatabaseLocation, StoreConfig};
use crate::error::{StoreError, StoreResult, map_sqlx_error};
use crate::schema;

/// Handle to one inventory database.
///
/// Every operation acquires a connection (and, for writes, a transaction) for
/// its own duration and releases it before returning. The handle is cheap to
/// clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    revision: CatalogRevision,
}

impl Store {
    /// Open (creating if needed) the database described by `config`.
    #[instrument(skip(config), fields(revision = %config.revision), err)]
    pub async fn open(config: &StoreConfig) -> StoreResult<Self> {
        let options = match &config.location {
            DatabaseLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::Config(format!(
                            "failed to create database directory at {parent:?}: {e}"
                        ))
                    })?;
                }
                debug!(path = ?path, "opening inventory database");
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
            }
            DatabaseLocation::InMemory => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| map_sqlx_error("parse_connect_options", e))?,
        };

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections.max(1));
        if config.location == DatabaseLocation::InMemory {
            // The database lives and dies with its single connection.
            pool_options = pool_options
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        schema::migrate(&pool, config.revision).await?;

        Ok(Self {
            pool,
            revision: config.revision,
        })
    }

    /// The item-key revision this store was opened with.
    pub fn revision(&self) -> CatalogRevision {
        self.revision
    }

    /// Close all connections. Pending operations on clones will fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::scratch_path;

    #[tokio::test]
    async fn reopening_with_another_revision_is_refused() {
        let path = scratch_path("revision-pin");
        let store = Store::open(&StoreConfig::at_path(&path, CatalogRevision::NameKeyed))
            .await
            .unwrap();
        store.close().await;

        let err = Store::open(&StoreConfig::at_path(&path, CatalogRevision::NameCategoryKeyed))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));

        let again = Store::open(&StoreConfig::at_path(&path, CatalogRevision::NameKeyed))
            .await
            .unwrap();
        assert_eq!(again.revision(), CatalogRevision::NameKeyed);
        again.close().await;
        let _ = std::fs::remove_file(&path);
    }
}
