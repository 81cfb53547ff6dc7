//! Bootstrap data: the default warehouse and the demo inventory.

use chrono::{DateTime, Utc};
use tracing::info;

use shelfwise_core::{ItemId, ShelfId, WarehouseId};
use shelfwise_inventory::{CreateItem, CreateShelf, CreateWarehouse, Item, Shelf, Warehouse};

use crate::store::{InventoryStore, StoreError, StoreResult};

/// Return the default warehouse, creating it on first use.
///
/// Two callers racing on an empty store both try to insert; the loser gets a
/// `Conflict` from the single-default constraint and re-reads the winner.
pub async fn ensure_default_warehouse(store: &dyn InventoryStore, now: DateTime<Utc>) -> StoreResult<Warehouse> {
    if let Some(existing) = store.find_default_warehouse().await? {
        return Ok(existing);
    }

    let warehouse = Warehouse::new_default(WarehouseId::new(), now);
    match store.insert_warehouse(&warehouse).await {
        Ok(()) => {
            info!(warehouse_id = %warehouse.id, "created default warehouse");
            Ok(warehouse)
        }
        Err(StoreError::Conflict(_)) => store
            .find_default_warehouse()
            .await?
            .ok_or(StoreError::missing::<Warehouse>()),
        Err(e) => Err(e),
    }
}

struct SeedItem {
    name: &'static str,
    sku: &'static str,
    description: &'static str,
    quantity: i64,
    price: f64,
    category: &'static str,
}

struct SeedShelf {
    name: &'static str,
    section: &'static str,
    level: u8,
    capacity: i64,
    items: &'static [SeedItem],
}

struct SeedWarehouse {
    name: &'static str,
    location: &'static str,
    description: &'static str,
    capacity: i64,
    shelves: &'static [SeedShelf],
}

const DEMO: &[SeedWarehouse] = &[
    SeedWarehouse {
        name: "Main Distribution Center",
        location: "1234 Industrial Parkway, Portland, OR 97201",
        description: "Primary distribution facility for Pacific Northwest region",
        capacity: 50_000,
        shelves: &[
            SeedShelf {
                name: "A1",
                section: "A",
                level: 1,
                capacity: 500,
                items: &[
                    SeedItem {
                        name: "Laptop - Dell XPS 15",
                        sku: "TECH-LAPTOP-001",
                        description: "15-inch laptop with Intel i7 processor",
                        quantity: 25,
                        price: 1499.99,
                        category: "Electronics",
                    },
                    SeedItem {
                        name: "Wireless Mouse",
                        sku: "TECH-MOUSE-001",
                        description: "Ergonomic wireless mouse with USB receiver",
                        quantity: 150,
                        price: 29.99,
                        category: "Electronics",
                    },
                ],
            },
            SeedShelf {
                name: "A2",
                section: "A",
                level: 2,
                capacity: 500,
                items: &[SeedItem {
                    name: "USB-C Hub",
                    sku: "TECH-HUB-001",
                    description: "7-in-1 USB-C hub with HDMI and ethernet",
                    quantity: 75,
                    price: 49.99,
                    category: "Electronics",
                }],
            },
            SeedShelf {
                name: "B1",
                section: "B",
                level: 1,
                capacity: 800,
                items: &[
                    SeedItem {
                        name: "Office Chair - Ergonomic",
                        sku: "FURN-CHAIR-001",
                        description: "Mesh back office chair with lumbar support",
                        quantity: 40,
                        price: 299.99,
                        category: "Furniture",
                    },
                    SeedItem {
                        name: "Standing Desk",
                        sku: "FURN-DESK-001",
                        description: "Electric height-adjustable standing desk",
                        quantity: 20,
                        price: 599.99,
                        category: "Furniture",
                    },
                ],
            },
        ],
    },
    SeedWarehouse {
        name: "East Coast Hub",
        location: "567 Commerce Drive, Newark, NJ 07102",
        description: "Secondary distribution center serving East Coast markets",
        capacity: 35_000,
        shelves: &[
            SeedShelf {
                name: "A1",
                section: "A",
                level: 1,
                capacity: 600,
                items: &[
                    SeedItem {
                        name: "Monitor - 27 inch 4K",
                        sku: "TECH-MON-001",
                        description: "27-inch 4K IPS monitor with USB-C",
                        quantity: 30,
                        price: 449.99,
                        category: "Electronics",
                    },
                    SeedItem {
                        name: "Keyboard - Mechanical",
                        sku: "TECH-KB-001",
                        description: "RGB mechanical keyboard with brown switches",
                        quantity: 60,
                        price: 129.99,
                        category: "Electronics",
                    },
                ],
            },
            SeedShelf {
                name: "C1",
                section: "C",
                level: 1,
                capacity: 400,
                items: &[
                    SeedItem {
                        name: "Desk Lamp - LED",
                        sku: "OFF-LAMP-001",
                        description: "Adjustable LED desk lamp with USB charging",
                        quantity: 100,
                        price: 39.99,
                        category: "Office Supplies",
                    },
                    SeedItem {
                        name: "Notebook Set",
                        sku: "OFF-NOTE-001",
                        description: "Set of 5 ruled notebooks, A5 size",
                        quantity: 200,
                        price: 12.99,
                        category: "Office Supplies",
                    },
                ],
            },
        ],
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub warehouses: usize,
    pub shelves: usize,
    pub items: usize,
}

/// Insert the demo warehouses when the store holds no warehouses at all.
///
/// Shelves are laid out in a row, 3 units apart, so they fit the default
/// 20x20 floor plan.
pub async fn seed_demo_data(store: &dyn InventoryStore, now: DateTime<Utc>) -> StoreResult<SeedReport> {
    let mut report = SeedReport::default();
    if !store.list_warehouses().await?.is_empty() {
        info!("store already holds warehouses; skipping demo seed");
        return Ok(report);
    }

    for demo in DEMO {
        let warehouse = Warehouse::new(
            WarehouseId::new(),
            CreateWarehouse {
                name: demo.name.to_string(),
                location: demo.location.to_string(),
                description: Some(demo.description.to_string()),
                capacity: demo.capacity,
                width: None,
                length: None,
                height: None,
                grid_size: None,
            },
            now,
        )?;
        store.insert_warehouse(&warehouse).await?;
        report.warehouses += 1;

        for (index, demo_shelf) in demo.shelves.iter().enumerate() {
            let shelf = Shelf::new(
                ShelfId::new(),
                CreateShelf {
                    name: demo_shelf.name.to_string(),
                    location: format!("Section {}, Level {}", demo_shelf.section, demo_shelf.level),
                    capacity: demo_shelf.capacity,
                    warehouse_id: warehouse.id,
                    position_x: Some(2.0 + 3.0 * index as f64),
                    position_y: None,
                    position_z: Some(2.0),
                    width: None,
                    depth: None,
                    height: None,
                },
                now,
            )?;
            store.insert_shelf(&shelf).await?;
            report.shelves += 1;

            for demo_item in demo_shelf.items {
                let item = Item::new(
                    ItemId::new(),
                    CreateItem {
                        name: demo_item.name.to_string(),
                        sku: demo_item.sku.to_string(),
                        quantity: demo_item.quantity,
                        description: Some(demo_item.description.to_string()),
                        price: Some(demo_item.price),
                        category: Some(demo_item.category.to_string()),
                        shelf_id: shelf.id,
                    },
                    now,
                )?;
                store.create_item(&item).await?;
                report.items += 1;
            }
        }
    }

    info!(
        warehouses = report.warehouses,
        shelves = report.shelves,
        items = report.items,
        "seeded demo inventory"
    );
    Ok(report)
}
