//! Shared fixtures for store tests.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDate, Utc};
use storekeep_core::ItemId;
use storekeep_inventory::{CatalogRevision, IssueStock, MovementMetadata, Quantity, ReceiveStock};

use crate::{Store, StoreConfig};

pub(crate) async fn memory_store(revision: CatalogRevision) -> Store {
    Store::open(&StoreConfig::in_memory(revision))
        .await
        .expect("in-memory store should open")
}

/// Unique file path under the OS temp dir.
pub(crate) fn scratch_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!(
        "storekeep-{tag}-{}-{nanos}.db",
        std::process::id()
    ))
}

pub(crate) fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn at(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(10, 0, 0).unwrap().and_utc()
}

pub(crate) fn receipt(name: &str, category: &str, qty: u32, actor: &str, date: NaiveDate) -> ReceiveStock {
    ReceiveStock {
        name: name.to_string(),
        category: category.to_string(),
        quantity: Quantity::new(qty).unwrap(),
        actor: actor.to_string(),
        occurred_at: at(date),
        effective_date: Some(date),
        metadata: MovementMetadata::default(),
    }
}

pub(crate) fn issue(item_id: ItemId, qty: u32, actor: &str, destination: &str, date: NaiveDate) -> IssueStock {
    IssueStock {
        item_id,
        quantity: Quantity::new(qty).unwrap(),
        actor: actor.to_string(),
        destination: Some(destination.to_string()),
        occurred_at: at(date),
        effective_date: Some(date),
    }
}
