use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{NaiveDate, Utc};
use storekeep_core::ItemId;
use storekeep_inventory::{
    CatalogRevision, DateRange, IssueStock, MovementMetadata, Quantity, ReceiveStock,
    TransactionFilter, TxnType,
};
use storekeep_store::{Store, StoreConfig};
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn day(offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(u64::from(offset % 365))
}

fn receipt(name: &str, qty: u32, on: NaiveDate) -> ReceiveStock {
    ReceiveStock {
        name: name.to_string(),
        category: "Bench".to_string(),
        quantity: Quantity::new(qty).unwrap(),
        actor: "bench".to_string(),
        occurred_at: Utc::now(),
        effective_date: Some(on),
        metadata: MovementMetadata::default(),
    }
}

fn issue(item_id: ItemId, qty: u32, on: NaiveDate) -> IssueStock {
    IssueStock {
        item_id,
        quantity: Quantity::new(qty).unwrap(),
        actor: "bench".to_string(),
        destination: None,
        occurred_at: Utc::now(),
        effective_date: Some(on),
    }
}

fn open_store(rt: &Runtime) -> Store {
    rt.block_on(Store::open(&StoreConfig::in_memory(CatalogRevision::NameCategoryKeyed)))
        .unwrap()
}

fn bench_movements(c: &mut Criterion) {
    let mut group = c.benchmark_group("movement_latency");
    let rt = runtime();

    group.bench_function("receive_existing_item", |b| {
        let store = open_store(&rt);
        rt.block_on(store.receive(receipt("Pen", 1, day(0)))).unwrap();
        b.iter(|| {
            rt.block_on(store.receive(receipt("Pen", black_box(5), day(1))))
                .unwrap();
        });
    });

    group.bench_function("receive_then_issue", |b| {
        let store = open_store(&rt);
        let pen = rt.block_on(store.receive(receipt("Pen", 1, day(0)))).unwrap();
        let pen_id = pen.item.id_typed();
        b.iter(|| {
            rt.block_on(async {
                store.receive(receipt("Pen", 3, day(1))).await.unwrap();
                store.issue(issue(pen_id, black_box(3), day(2))).await.unwrap();
            });
        });
    });

    group.finish();
}

fn bench_filtered_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_transactions");
    let rt = runtime();

    for rows in [100u32, 1_000, 10_000].iter() {
        let store = open_store(&rt);
        rt.block_on(async {
            for i in 0..*rows {
                store
                    .receive(receipt(&format!("Item {}", i % 50), 1 + i % 7, day(i)))
                    .await
                    .unwrap();
            }
        });
        let window = DateRange::new(day(30), day(59)).unwrap();

        group.throughput(Throughput::Elements(u64::from(*rows)));
        group.bench_with_input(BenchmarkId::new("name_type_range", rows), rows, |b, _| {
            let filter = TransactionFilter::default()
                .name_contains("Item 1")
                .of_type(TxnType::In)
                .between(window);
            b.iter(|| black_box(rt.block_on(store.list_transactions(&filter)).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("unfiltered", rows), rows, |b, _| {
            let filter = TransactionFilter::default();
            b.iter(|| black_box(rt.block_on(store.list_transactions(&filter)).unwrap()));
        });
    }

    group.finish();
}

fn bench_audit(c: &mut Criterion) {
    let rt = runtime();
    let store = open_store(&rt);
    rt.block_on(async {
        for i in 0..2_000u32 {
            store
                .receive(receipt(&format!("Item {}", i % 100), 2, day(i)))
                .await
                .unwrap();
        }
    });
    c.bench_function("audit_2000_rows", |b| {
        b.iter(|| black_box(rt.block_on(store.audit()).unwrap()));
    });
}

criterion_group!(benches, bench_movements, bench_filtered_listing, bench_audit);
criterion_main!(benches);
