//! Store configuration.
//!
//! Configuration comes from the environment with sensible defaults:
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `STOREKEEP_DB` | Path to the SQLite file (`:memory:` for a throwaway store) | `{data_dir}/storekeep/inventory.db` |
//! | `STOREKEEP_REVISION` | `name` or `name-category` | `name-category` |
//! | `STOREKEEP_DB_MAX_CONNECTIONS` | Pool size for file-backed stores | `4` |

use std::path::{Path, PathBuf};

use storekeep_inventory::CatalogRevision;

use crate::error::StoreError;

pub const DB_PATH_ENV: &str = "STOREKEEP_DB";
pub const REVISION_ENV: &str = "STOREKEEP_REVISION";
pub const MAX_CONNECTIONS_ENV: &str = "STOREKEEP_DB_MAX_CONNECTIONS";

const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    /// Private in-memory database; gone when the store is closed.
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: DatabaseLocation,
    pub revision: CatalogRevision,
    pub max_connections: u32,
}

impl StoreConfig {
    pub fn at_path(path: impl AsRef<Path>, revision: CatalogRevision) -> Self {
        Self {
            location: DatabaseLocation::File(path.as_ref().to_path_buf()),
            revision,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn in_memory(revision: CatalogRevision) -> Self {
        Self {
            location: DatabaseLocation::InMemory,
            revision,
            max_connections: 1,
        }
    }

    /// Build the configuration from `STOREKEEP_*` environment variables.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`StoreConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let revision = match lookup(REVISION_ENV) {
            Some(raw) => raw
                .parse::<CatalogRevision>()
                .map_err(|e| StoreError::Config(format!("{REVISION_ENV}: {e}")))?,
            None => CatalogRevision::default(),
        };

        let location = match lookup(DB_PATH_ENV) {
            Some(raw) if raw.trim() == ":memory:" => DatabaseLocation::InMemory,
            Some(raw) if !raw.trim().is_empty() => DatabaseLocation::File(PathBuf::from(raw.trim())),
            _ => DatabaseLocation::File(default_database_path()?),
        };

        let max_connections = match (&location, lookup(MAX_CONNECTIONS_ENV)) {
            (DatabaseLocation::InMemory, _) => 1,
            (_, Some(raw)) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(StoreError::Config(format!(
                        "{MAX_CONNECTIONS_ENV} must be a positive integer, got '{raw}'"
                    )));
                }
            },
            (_, None) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            location,
            revision,
            max_connections,
        })
    }
}

/// Resolve the default database file: `{app_data_dir}/storekeep/inventory.db`.
pub fn default_database_path() -> Result<PathBuf, StoreError> {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|mut h| {
            h.push(".local");
            h.push("share");
            h
        }))
        .ok_or_else(|| {
            StoreError::Config(
                "failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share"
                    .to_string(),
            )
        })?;

    let mut path = base;
    path.push("storekeep");
    path.push("inventory.db");
    Ok(path)
}
