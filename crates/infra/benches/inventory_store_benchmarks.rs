use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use shelfwise_core::{ItemId, ShelfId, WarehouseId};
use shelfwise_infra::store::{InMemoryInventoryStore, InventoryStore};
use shelfwise_inventory::{CreateItem, CreateShelf, Item, Shelf, Warehouse, WarehouseStatistics};
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

fn item(shelf_id: ShelfId, n: usize) -> Item {
    Item::new(
        ItemId::new(),
        CreateItem {
            name: format!("Item {n}"),
            sku: format!("BENCH-{n:06}"),
            quantity: 1,
            description: None,
            price: Some(1.0),
            category: None,
            shelf_id,
        },
        Utc::now(),
    )
    .unwrap()
}

/// Store with one warehouse and one shelf holding `items` single-unit items.
fn populated(rt: &Runtime, items: usize) -> (InMemoryInventoryStore, Warehouse, Shelf) {
    let store = InMemoryInventoryStore::new();
    let warehouse = Warehouse::new_default(WarehouseId::new(), Utc::now());
    let shelf = Shelf::new(
        ShelfId::new(),
        CreateShelf {
            name: "A1".to_string(),
            location: "Aisle A".to_string(),
            capacity: i64::MAX / 2,
            warehouse_id: warehouse.id,
            position_x: Some(1.0),
            position_y: None,
            position_z: Some(1.0),
            width: None,
            depth: None,
            height: None,
        },
        Utc::now(),
    )
    .unwrap();

    rt.block_on(async {
        store.insert_warehouse(&warehouse).await.unwrap();
        store.insert_shelf(&shelf).await.unwrap();
        for n in 0..items {
            store.create_item(&item(shelf.id, n)).await.unwrap();
        }
    });
    (store, warehouse, shelf)
}

fn bench_capacity_checked_writes(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("capacity_checked_writes");

    for shelf_items in [10usize, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("adjust_quantity", shelf_items),
            shelf_items,
            |b, &size| {
                let (store, _, shelf) = populated(&rt, size);
                let target = rt.block_on(store.list_items(Some(shelf.id))).unwrap()[0].id;
                b.iter(|| {
                    rt.block_on(store.adjust_item_quantity(target, black_box(1), Utc::now()))
                        .unwrap();
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("create_item", shelf_items),
            shelf_items,
            |b, &size| {
                let (store, _, shelf) = populated(&rt, size);
                let mut n = size;
                b.iter(|| {
                    n += 1;
                    rt.block_on(store.create_item(&item(shelf.id, n))).unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_warehouse_statistics(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("warehouse_statistics");

    for shelf_items in [100usize, 1000].iter() {
        group.throughput(Throughput::Elements(*shelf_items as u64));
        group.bench_with_input(BenchmarkId::new("compute", shelf_items), shelf_items, |b, &size| {
            let (store, warehouse, _) = populated(&rt, size);
            let shelves = rt.block_on(store.list_shelves(Some(warehouse.id))).unwrap();
            let items = rt.block_on(store.list_items_in_warehouse(warehouse.id)).unwrap();
            b.iter(|| black_box(WarehouseStatistics::compute(&warehouse, &shelves, &items)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_capacity_checked_writes, bench_warehouse_statistics);
criterion_main!(benches);
