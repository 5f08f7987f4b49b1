//! End-to-end ledger scenarios through the public store API.

use chrono::{NaiveDate, Utc};
use storekeep_core::{DomainError, ItemId};
use storekeep_inventory::{
    CatalogRevision, DateRange, IssueStock, ItemFilter, MovementMetadata, Quantity, ReceiveStock,
    TransactionFilter, TxnType,
};
use storekeep_store::{Store, StoreConfig, StoreError};

async fn open(revision: CatalogRevision) -> Store {
    Store::open(&StoreConfig::in_memory(revision))
        .await
        .expect("failed to open in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn receive(name: &str, category: &str, qty: u32, actor: &str, on: NaiveDate) -> ReceiveStock {
    ReceiveStock {
        name: name.into(),
        category: category.into(),
        quantity: Quantity::new(qty).unwrap(),
        actor: actor.into(),
        occurred_at: Utc::now(),
        effective_date: Some(on),
        metadata: MovementMetadata::default(),
    }
}

fn issue(item_id: ItemId, qty: u32, actor: &str, on: NaiveDate) -> IssueStock {
    IssueStock {
        item_id,
        quantity: Quantity::new(qty).unwrap(),
        actor: actor.into(),
        destination: Some("Store room".into()),
        occurred_at: Utc::now(),
        effective_date: Some(on),
    }
}

#[tokio::test]
async fn a_day_at_the_stores() {
    let store = open(CatalogRevision::NameCategoryKeyed).await;

    store.add_category("Stationery").await.unwrap();
    store.add_category("Office").await.unwrap();
    assert_eq!(
        store.category_names().await.unwrap(),
        vec!["Stationery".to_string(), "Office".to_string()]
    );

    let pen = store
        .receive(receive("Pen", "Stationery", 100, "Alice", date(2024, 1, 1)))
        .await
        .unwrap();
    let pen_id = pen.item.id_typed();

    let after_issue = store
        .issue(issue(pen_id, 30, "Bob", date(2024, 1, 2)))
        .await
        .unwrap();
    assert_eq!(after_issue.new_quantity(), 70);

    let err = store
        .issue(issue(pen_id, 100, "Bob", date(2024, 1, 3)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Domain(DomainError::InsufficientStock {
            requested: 100,
            available: 70
        })
    ));

    let items = store
        .list_items(&ItemFilter::default().name_contains("pe"))
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity(), 70);

    let outs = store
        .list_transactions(
            &TransactionFilter::default()
                .of_type(TxnType::Out)
                .between(DateRange::new(date(2024, 1, 1), date(2024, 1, 2)).unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(outs.len(), 1);
    assert_eq!(outs[0].actor, "Bob");
    assert_eq!(outs[0].quantity, 30);

    assert!(store.audit().await.unwrap().is_consistent());
}

#[tokio::test]
async fn category_deletion_does_not_touch_items_or_ledger() {
    let store = open(CatalogRevision::NameCategoryKeyed).await;
    let stationery = store.add_category("Stationery").await.unwrap();
    store
        .receive(receive("Pen", "Stationery", 5, "Alice", date(2024, 1, 1)))
        .await
        .unwrap();

    store.delete_category(stationery.id).await.unwrap();

    assert!(store.list_categories().await.unwrap().is_empty());
    let items = store
        .list_items(&ItemFilter::default().in_category("Stationery"))
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(
        store
            .list_transactions(&TransactionFilter::default())
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn name_keyed_store_tracks_one_item_per_name() {
    let store = open(CatalogRevision::NameKeyed).await;
    store
        .receive(receive("Pen", "Stationery", 5, "Alice", date(2024, 1, 1)))
        .await
        .unwrap();
    let moved = store
        .receive(receive("Pen", "Office", 5, "Alice", date(2024, 1, 2)))
        .await
        .unwrap();

    assert_eq!(moved.new_quantity(), 10);
    let found = store.find_item("Pen", "anything").await.unwrap().unwrap();
    assert_eq!(found.category(), "Office");
    assert_eq!(store.list_items(&ItemFilter::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn wildcards_in_search_text_match_literally() {
    let store = open(CatalogRevision::NameCategoryKeyed).await;
    store
        .receive(receive("100% cotton", "Linen", 2, "Alice", date(2024, 1, 1)))
        .await
        .unwrap();
    store
        .receive(receive("1000 sheets", "Stationery", 2, "Alice", date(2024, 1, 1)))
        .await
        .unwrap();

    let hits = store
        .list_items(&ItemFilter::default().name_contains("0%"))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name(), "100% cotton");
}
