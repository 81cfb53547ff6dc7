use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use chrono::Utc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::info;

use shelfwise_core::{ItemId, ShelfId, WarehouseId};
use shelfwise_infra::{
    seed, AppConfig, InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, StoreError, StoreResult,
};
use shelfwise_inventory::{
    search, AdjustQuantity, CreateItem, CreateShelf, CreateWarehouse, Item, MoveItem, Shelf, ShelfStatistics,
    UpdateItem, UpdateShelf, UpdateWarehouse, Warehouse, WarehouseStatistics,
};

use crate::app::dto::{
    ChangeNotice, ClearedShelf, DefaultWarehouseView, ItemDetail, SearchResult, ShelfDetail, ShelfSummary,
    ShelfWithItems, ShelfWithWarehouse, WarehouseDetail, WarehouseWithShelves,
};

const CHANGE_FEED_CAPACITY: usize = 256;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Shared state behind every handler.
pub struct AppServices {
    store: Arc<dyn InventoryStore>,
    changes: broadcast::Sender<ChangeNotice>,
    started_at: Instant,
}

/// Pick the store from config, run migrations and the optional demo seed.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn InventoryStore> = match &config.database {
        Some(db) => {
            let store = PostgresInventoryStore::connect(&db.url, db.max_connections)
                .await
                .context("connecting to postgres")?;
            store.migrate().await.context("applying schema")?;
            info!(max_connections = db.max_connections, "using postgres inventory store");
            Arc::new(store)
        }
        None => {
            info!("using in-memory inventory store");
            Arc::new(InMemoryInventoryStore::new())
        }
    };

    if config.seed_data {
        seed::seed_demo_data(store.as_ref(), Utc::now())
            .await
            .context("seeding demo data")?;
    }

    Ok(AppServices::new(store))
}

fn group_items(items: Vec<Item>) -> HashMap<ShelfId, Vec<Item>> {
    let mut by_shelf: HashMap<ShelfId, Vec<Item>> = HashMap::new();
    for item in items {
        by_shelf.entry(item.shelf_id).or_default().push(item);
    }
    by_shelf
}

fn group_shelves(shelves: Vec<Shelf>) -> HashMap<WarehouseId, Vec<Shelf>> {
    let mut by_warehouse: HashMap<WarehouseId, Vec<Shelf>> = HashMap::new();
    for shelf in shelves {
        by_warehouse.entry(shelf.warehouse_id).or_default().push(shelf);
    }
    by_warehouse
}

impl AppServices {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            store,
            changes,
            started_at: Instant::now(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryInventoryStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn InventoryStore> {
        &self.store
    }

    pub fn changes(&self) -> &broadcast::Sender<ChangeNotice> {
        &self.changes
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub async fn ping(&self) -> StoreResult<()> {
        self.store.ping().await
    }

    fn publish(&self, topic: &'static str, id: impl ToString, warehouse_id: Option<WarehouseId>) {
        // No subscribers is not an error.
        let _ = self.changes.send(ChangeNotice {
            topic,
            id: id.to_string(),
            warehouse_id,
        });
    }

    async fn require_warehouse(&self, id: WarehouseId) -> StoreResult<Warehouse> {
        self.store.get_warehouse(id).await?.ok_or(StoreError::missing::<Warehouse>())
    }

    async fn require_shelf(&self, id: ShelfId) -> StoreResult<Shelf> {
        self.store.get_shelf(id).await?.ok_or(StoreError::missing::<Shelf>())
    }

    async fn require_item(&self, id: ItemId) -> StoreResult<Item> {
        self.store.get_item(id).await?.ok_or(StoreError::missing::<Item>())
    }

    // -------------------------
    // Warehouses
    // -------------------------

    pub async fn list_warehouses(&self) -> StoreResult<Vec<WarehouseWithShelves>> {
        let warehouses = self.store.list_warehouses().await?;
        let mut shelves = group_shelves(self.store.list_shelves(None).await?);
        Ok(warehouses
            .into_iter()
            .map(|warehouse| WarehouseWithShelves {
                shelves: shelves.remove(&warehouse.id).unwrap_or_default(),
                warehouse,
            })
            .collect())
    }

    pub async fn warehouse_detail(&self, id: WarehouseId) -> StoreResult<WarehouseDetail> {
        let warehouse = self.require_warehouse(id).await?;
        let shelves = self.store.list_shelves(Some(id)).await?;
        let mut items = group_items(self.store.list_items_in_warehouse(id).await?);
        Ok(WarehouseDetail {
            warehouse,
            shelves: shelves
                .into_iter()
                .map(|shelf| ShelfWithItems {
                    items: items.remove(&shelf.id).unwrap_or_default(),
                    shelf,
                })
                .collect(),
        })
    }

    pub async fn create_warehouse(&self, input: CreateWarehouse) -> StoreResult<WarehouseWithShelves> {
        let warehouse = Warehouse::new(WarehouseId::new(), input, Utc::now())?;
        self.store.insert_warehouse(&warehouse).await?;
        info!(warehouse_id = %warehouse.id, name = %warehouse.name, "warehouse created");
        self.publish("warehouse.created", warehouse.id, Some(warehouse.id));
        Ok(WarehouseWithShelves {
            warehouse,
            shelves: Vec::new(),
        })
    }

    /// Shrinking the floor plan is refused while a shelf would end up outside it.
    pub async fn update_warehouse(&self, id: WarehouseId, patch: UpdateWarehouse) -> StoreResult<WarehouseWithShelves> {
        let warehouse = self.store.update_warehouse(id, &patch, Utc::now()).await?;
        let shelves = self.store.list_shelves(Some(id)).await?;
        info!(warehouse_id = %id, "warehouse updated");
        self.publish("warehouse.updated", id, Some(id));
        Ok(WarehouseWithShelves { warehouse, shelves })
    }

    pub async fn delete_warehouse(&self, id: WarehouseId) -> StoreResult<()> {
        self.store.delete_warehouse(id).await?;
        info!(warehouse_id = %id, "warehouse deleted");
        self.publish("warehouse.deleted", id, Some(id));
        Ok(())
    }

    pub async fn warehouse_statistics(&self, id: WarehouseId) -> StoreResult<WarehouseStatistics> {
        let warehouse = self.require_warehouse(id).await?;
        let shelves = self.store.list_shelves(Some(id)).await?;
        let items = self.store.list_items_in_warehouse(id).await?;
        Ok(WarehouseStatistics::compute(&warehouse, &shelves, &items))
    }

    async fn default_view(&self, warehouse: Warehouse) -> StoreResult<DefaultWarehouseView> {
        let shelves = self.store.list_shelves(Some(warehouse.id)).await?;
        let items = group_items(self.store.list_items_in_warehouse(warehouse.id).await?);
        let shelves = shelves
            .into_iter()
            .map(|shelf| ShelfSummary {
                item_count: items.get(&shelf.id).map_or(0, Vec::len),
                shelf,
            })
            .collect();
        Ok(DefaultWarehouseView { warehouse, shelves })
    }

    /// The warehouse the floor-plan editor works on, created on first request.
    pub async fn default_warehouse(&self) -> StoreResult<DefaultWarehouseView> {
        let warehouse = seed::ensure_default_warehouse(self.store.as_ref(), Utc::now()).await?;
        self.default_view(warehouse).await
    }

    pub async fn update_default_warehouse(&self, patch: UpdateWarehouse) -> StoreResult<DefaultWarehouseView> {
        let warehouse = seed::ensure_default_warehouse(self.store.as_ref(), Utc::now()).await?;
        let updated = self.update_warehouse(warehouse.id, patch).await?;
        self.default_view(updated.warehouse).await
    }

    // -------------------------
    // Shelves
    // -------------------------

    async fn shelf_detail_for(&self, shelf: Shelf) -> StoreResult<ShelfDetail> {
        let warehouse = self.require_warehouse(shelf.warehouse_id).await?;
        let items = self.store.list_items(Some(shelf.id)).await?;
        Ok(ShelfDetail { shelf, warehouse, items })
    }

    pub async fn list_shelves(&self, warehouse_id: Option<WarehouseId>) -> StoreResult<Vec<ShelfDetail>> {
        let shelves = self.store.list_shelves(warehouse_id).await?;
        let warehouses: HashMap<WarehouseId, Warehouse> = self
            .store
            .list_warehouses()
            .await?
            .into_iter()
            .map(|w| (w.id, w))
            .collect();
        let mut items = match warehouse_id {
            Some(id) => group_items(self.store.list_items_in_warehouse(id).await?),
            None => group_items(self.store.list_items(None).await?),
        };

        let mut out = Vec::with_capacity(shelves.len());
        for shelf in shelves {
            // A shelf whose warehouse vanished between the two reads was cascaded away.
            let Some(warehouse) = warehouses.get(&shelf.warehouse_id).cloned() else {
                continue;
            };
            out.push(ShelfDetail {
                items: items.remove(&shelf.id).unwrap_or_default(),
                warehouse,
                shelf,
            });
        }
        Ok(out)
    }

    pub async fn shelf_detail(&self, id: ShelfId) -> StoreResult<ShelfDetail> {
        let shelf = self.require_shelf(id).await?;
        self.shelf_detail_for(shelf).await
    }

    pub async fn create_shelf(&self, input: CreateShelf) -> StoreResult<ShelfDetail> {
        let shelf = Shelf::new(ShelfId::new(), input, Utc::now())?;
        self.store.insert_shelf(&shelf).await?;
        let warehouse = self.require_warehouse(shelf.warehouse_id).await?;
        info!(shelf_id = %shelf.id, warehouse_id = %warehouse.id, "shelf created");
        self.publish("shelf.created", shelf.id, Some(warehouse.id));
        Ok(ShelfDetail {
            shelf,
            warehouse,
            items: Vec::new(),
        })
    }

    pub async fn update_shelf(&self, id: ShelfId, patch: UpdateShelf) -> StoreResult<ShelfDetail> {
        let shelf = self.store.update_shelf(id, &patch, Utc::now()).await?;
        info!(shelf_id = %id, "shelf updated");
        self.publish("shelf.updated", id, Some(shelf.warehouse_id));
        self.shelf_detail_for(shelf).await
    }

    pub async fn delete_shelf(&self, id: ShelfId) -> StoreResult<()> {
        let shelf = self.require_shelf(id).await?;
        self.store.delete_shelf(id).await?;
        info!(shelf_id = %id, "shelf deleted");
        self.publish("shelf.deleted", id, Some(shelf.warehouse_id));
        Ok(())
    }

    pub async fn shelf_statistics(&self, id: ShelfId) -> StoreResult<ShelfStatistics> {
        let shelf = self.require_shelf(id).await?;
        let items = self.store.list_items(Some(id)).await?;
        Ok(ShelfStatistics::compute(&shelf, &items))
    }

    pub async fn clear_shelf(&self, id: ShelfId) -> StoreResult<ClearedShelf> {
        let shelf = self.require_shelf(id).await?;
        let deleted = self.store.clear_shelf(id).await?;
        info!(shelf_id = %id, deleted_items = deleted, "shelf cleared");
        self.publish("shelf.cleared", id, Some(shelf.warehouse_id));
        Ok(ClearedShelf {
            shelf_id: id,
            deleted_items_count: deleted,
        })
    }

    // -------------------------
    // Items
    // -------------------------

    async fn item_detail_for(&self, item: Item) -> StoreResult<ItemDetail> {
        let shelf = self.require_shelf(item.shelf_id).await?;
        let warehouse = self.require_warehouse(shelf.warehouse_id).await?;
        Ok(ItemDetail {
            item,
            shelf: ShelfWithWarehouse { shelf, warehouse },
        })
    }

    pub async fn list_items(&self, shelf_id: Option<ShelfId>) -> StoreResult<Vec<ItemDetail>> {
        let items = self.store.list_items(shelf_id).await?;
        let shelves: HashMap<ShelfId, Shelf> = self
            .store
            .list_shelves(None)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        let warehouses: HashMap<WarehouseId, Warehouse> = self
            .store
            .list_warehouses()
            .await?
            .into_iter()
            .map(|w| (w.id, w))
            .collect();

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let shelf = shelves.get(&item.shelf_id)?.clone();
                let warehouse = warehouses.get(&shelf.warehouse_id)?.clone();
                Some(ItemDetail {
                    item,
                    shelf: ShelfWithWarehouse { shelf, warehouse },
                })
            })
            .collect())
    }

    pub async fn item_detail(&self, id: ItemId) -> StoreResult<ItemDetail> {
        let item = self.require_item(id).await?;
        self.item_detail_for(item).await
    }

    pub async fn item_by_sku(&self, sku: &str) -> StoreResult<ItemDetail> {
        let item = self
            .store
            .get_item_by_sku(sku)
            .await?
            .ok_or(StoreError::missing::<Item>())?;
        self.item_detail_for(item).await
    }

    pub async fn create_item(&self, input: CreateItem) -> StoreResult<ItemDetail> {
        let item = Item::new(ItemId::new(), input, Utc::now())?;
        self.store.create_item(&item).await?;
        info!(item_id = %item.id, sku = %item.sku, shelf_id = %item.shelf_id, "item created");
        let detail = self.item_detail_for(item).await?;
        self.publish("item.created", detail.item.id, Some(detail.shelf.warehouse.id));
        Ok(detail)
    }

    pub async fn update_item(&self, id: ItemId, patch: UpdateItem) -> StoreResult<ItemDetail> {
        patch.validate()?;
        let item = self.store.update_item(id, &patch, Utc::now()).await?;
        info!(item_id = %id, "item updated");
        let detail = self.item_detail_for(item).await?;
        self.publish("item.updated", id, Some(detail.shelf.warehouse.id));
        Ok(detail)
    }

    pub async fn delete_item(&self, id: ItemId) -> StoreResult<()> {
        let item = self.require_item(id).await?;
        let warehouse_id = self.store.get_shelf(item.shelf_id).await?.map(|s| s.warehouse_id);
        self.store.delete_item(id).await?;
        info!(item_id = %id, "item deleted");
        self.publish("item.deleted", id, warehouse_id);
        Ok(())
    }

    pub async fn adjust_item_quantity(&self, id: ItemId, input: AdjustQuantity) -> StoreResult<ItemDetail> {
        let item = self.store.adjust_item_quantity(id, input.adjustment, Utc::now()).await?;
        info!(item_id = %id, adjustment = input.adjustment, quantity = item.quantity, "item quantity adjusted");
        let detail = self.item_detail_for(item).await?;
        self.publish("item.adjusted", id, Some(detail.shelf.warehouse.id));
        Ok(detail)
    }

    pub async fn move_item(&self, id: ItemId, input: MoveItem) -> StoreResult<ItemDetail> {
        let item = self.store.move_item(id, &input, Utc::now()).await?;
        info!(
            item_id = %id,
            target_shelf_id = %input.target_shelf_id,
            result_item_id = %item.id,
            "item moved"
        );
        let detail = self.item_detail_for(item).await?;
        self.publish("item.moved", id, Some(detail.shelf.warehouse.id));
        Ok(detail)
    }

    // -------------------------
    // Search
    // -------------------------

    pub async fn search(&self, query: &str, exact: bool, limit: usize) -> StoreResult<SearchResult> {
        let items = self.store.list_items(None).await?;
        let matches: Vec<Item> = search::matching_items(&items, query, exact).into_iter().cloned().collect();
        let shelf_ids = search::shelves_holding(&matches);
        let suggestions = search::suggestions(&items, query, limit);

        Ok(SearchResult {
            query: query.to_string(),
            found: !shelf_ids.is_empty(),
            shelf_ids,
            items: matches,
            suggestions,
        })
    }
}

/// Server-sent events relaying every [`ChangeNotice`].
///
/// Slow subscribers that lag behind the channel silently skip the dropped notices.
pub fn change_stream(services: Arc<AppServices>) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.changes().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(notice) => {
            let data = serde_json::to_string(&notice).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(notice.topic).data(data)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use shelfwise_inventory::DefaultWarehouse;

    /// In-memory store that pauses before every read, so concurrent requests
    /// interleave the way they do against a networked database.
    struct SlowReads(InMemoryInventoryStore);

    impl SlowReads {
        async fn pause() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    #[async_trait::async_trait]
    impl InventoryStore for SlowReads {
        async fn ping(&self) -> StoreResult<()> {
            self.0.ping().await
        }
        async fn list_warehouses(&self) -> StoreResult<Vec<Warehouse>> {
            Self::pause().await;
            self.0.list_warehouses().await
        }
        async fn get_warehouse(&self, id: WarehouseId) -> StoreResult<Option<Warehouse>> {
            Self::pause().await;
            self.0.get_warehouse(id).await
        }
        async fn find_default_warehouse(&self) -> StoreResult<Option<Warehouse>> {
            Self::pause().await;
            self.0.find_default_warehouse().await
        }
        async fn insert_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()> {
            self.0.insert_warehouse(warehouse).await
        }
        async fn update_warehouse(
            &self,
            id: WarehouseId,
            patch: &UpdateWarehouse,
            now: DateTime<Utc>,
        ) -> StoreResult<Warehouse> {
            self.0.update_warehouse(id, patch, now).await
        }
        async fn delete_warehouse(&self, id: WarehouseId) -> StoreResult<()> {
            self.0.delete_warehouse(id).await
        }
        async fn list_shelves(&self, warehouse_id: Option<WarehouseId>) -> StoreResult<Vec<Shelf>> {
            Self::pause().await;
            self.0.list_shelves(warehouse_id).await
        }
        async fn get_shelf(&self, id: ShelfId) -> StoreResult<Option<Shelf>> {
            Self::pause().await;
            self.0.get_shelf(id).await
        }
        async fn insert_shelf(&self, shelf: &Shelf) -> StoreResult<()> {
            self.0.insert_shelf(shelf).await
        }
        async fn update_shelf(&self, id: ShelfId, patch: &UpdateShelf, now: DateTime<Utc>) -> StoreResult<Shelf> {
            self.0.update_shelf(id, patch, now).await
        }
        async fn delete_shelf(&self, id: ShelfId) -> StoreResult<()> {
            self.0.delete_shelf(id).await
        }
        async fn clear_shelf(&self, id: ShelfId) -> StoreResult<u64> {
            self.0.clear_shelf(id).await
        }
        async fn list_items(&self, shelf_id: Option<ShelfId>) -> StoreResult<Vec<Item>> {
            Self::pause().await;
            self.0.list_items(shelf_id).await
        }
        async fn list_items_in_warehouse(&self, warehouse_id: WarehouseId) -> StoreResult<Vec<Item>> {
            Self::pause().await;
            self.0.list_items_in_warehouse(warehouse_id).await
        }
        async fn get_item(&self, id: ItemId) -> StoreResult<Option<Item>> {
            Self::pause().await;
            self.0.get_item(id).await
        }
        async fn get_item_by_sku(&self, sku: &str) -> StoreResult<Option<Item>> {
            Self::pause().await;
            self.0.get_item_by_sku(sku).await
        }
        async fn create_item(&self, item: &Item) -> StoreResult<()> {
            self.0.create_item(item).await
        }
        async fn update_item(&self, id: ItemId, patch: &UpdateItem, now: DateTime<Utc>) -> StoreResult<Item> {
            self.0.update_item(id, patch, now).await
        }
        async fn delete_item(&self, id: ItemId) -> StoreResult<()> {
            self.0.delete_item(id).await
        }
        async fn adjust_item_quantity(&self, id: ItemId, adjustment: i64, now: DateTime<Utc>) -> StoreResult<Item> {
            self.0.adjust_item_quantity(id, adjustment, now).await
        }
        async fn move_item(&self, id: ItemId, input: &MoveItem, now: DateTime<Utc>) -> StoreResult<Item> {
            self.0.move_item(id, input, now).await
        }
    }

    fn slow_services() -> AppServices {
        AppServices::new(Arc::new(SlowReads(InMemoryInventoryStore::new())))
    }

    fn warehouse_input(name: &str) -> CreateWarehouse {
        CreateWarehouse {
            name: name.to_string(),
            location: "Dock 1".to_string(),
            description: None,
            capacity: 1000,
            width: Some(10.0),
            length: Some(10.0),
            height: None,
            grid_size: None,
        }
    }

    fn shelf_input(warehouse_id: WarehouseId, x: f64) -> CreateShelf {
        CreateShelf {
            name: "A1".to_string(),
            location: "Aisle A".to_string(),
            capacity: 10,
            warehouse_id,
            position_x: Some(x),
            position_y: None,
            position_z: Some(1.0),
            width: None,
            depth: None,
            height: None,
        }
    }

    #[tokio::test]
    async fn shelf_outside_warehouse_bounds_is_rejected() {
        let services = AppServices::in_memory();
        let warehouse = services.create_warehouse(warehouse_input("North")).await.unwrap();

        let err = services
            .create_shelf(shelf_input(warehouse.warehouse.id, 9.8))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(shelfwise_core::DomainError::InvariantViolation(_))));

        let ok = services.create_shelf(shelf_input(warehouse.warehouse.id, 2.0)).await.unwrap();
        let err = services
            .update_shelf(
                ok.shelf.id,
                UpdateShelf {
                    position_x: Some(50.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(shelfwise_core::DomainError::InvariantViolation(_))));
    }

    #[tokio::test]
    async fn warehouse_cannot_shrink_under_its_shelves() {
        let services = AppServices::in_memory();
        let warehouse = services.create_warehouse(warehouse_input("North")).await.unwrap();
        services.create_shelf(shelf_input(warehouse.warehouse.id, 8.0)).await.unwrap();

        let err = services
            .update_warehouse(
                warehouse.warehouse.id,
                UpdateWarehouse {
                    width: Some(5.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(shelfwise_core::DomainError::InvariantViolation(_))));
    }

    #[tokio::test]
    async fn default_warehouse_counts_items_per_shelf() {
        let services = AppServices::in_memory();
        let view = services.default_warehouse().await.unwrap();
        assert_eq!(view.warehouse.name, DefaultWarehouse::NAME);
        assert!(view.shelves.is_empty());

        let shelf = services.create_shelf(shelf_input(view.warehouse.id, 1.0)).await.unwrap();
        services
            .create_item(CreateItem {
                name: "Bolt".to_string(),
                sku: "BOLT-1".to_string(),
                quantity: 3,
                description: None,
                price: None,
                category: None,
                shelf_id: shelf.shelf.id,
            })
            .await
            .unwrap();

        let again = services.default_warehouse().await.unwrap();
        assert_eq!(again.warehouse.id, view.warehouse.id);
        assert_eq!(again.shelves.len(), 1);
        assert_eq!(again.shelves[0].item_count, 1);
    }

    #[tokio::test]
    async fn concurrent_shelf_patches_keep_both_changes() {
        let services = slow_services();
        let warehouse = services.create_warehouse(warehouse_input("North")).await.unwrap();
        let shelf = services.create_shelf(shelf_input(warehouse.warehouse.id, 2.0)).await.unwrap();
        let id = shelf.shelf.id;

        let rename = UpdateShelf {
            name: Some("B7".to_string()),
            ..Default::default()
        };
        let slide = UpdateShelf {
            position_x: Some(7.0),
            ..Default::default()
        };
        let (renamed, slid) = tokio::join!(services.update_shelf(id, rename), services.update_shelf(id, slide));
        renamed.unwrap();
        slid.unwrap();

        let stored = services.store().get_shelf(id).await.unwrap().unwrap();
        assert_eq!(stored.name, "B7");
        assert_eq!(stored.position_x, 7.0);
    }

    #[tokio::test]
    async fn concurrent_shrink_and_shelf_move_never_strand_a_shelf() {
        let services = slow_services();
        let warehouse = services.create_warehouse(warehouse_input("North")).await.unwrap();
        let wid = warehouse.warehouse.id;
        let shelf = services.create_shelf(shelf_input(wid, 2.0)).await.unwrap();
        let id = shelf.shelf.id;

        let slide = UpdateShelf {
            position_x: Some(7.0),
            ..Default::default()
        };
        let shrink = UpdateWarehouse {
            width: Some(5.0),
            ..Default::default()
        };
        let (slid, shrunk) = tokio::join!(services.update_shelf(id, slide), services.update_warehouse(wid, shrink));
        assert!(slid.is_ok() != shrunk.is_ok(), "exactly one of the two writes must win");

        let stored_shelf = services.store().get_shelf(id).await.unwrap().unwrap();
        let stored_warehouse = services.store().get_warehouse(wid).await.unwrap().unwrap();
        assert!(stored_shelf.footprint().within(stored_warehouse.bounds()));
    }

    #[tokio::test]
    async fn deleting_an_item_announces_its_warehouse() {
        let services = AppServices::in_memory();
        let warehouse = services.create_warehouse(warehouse_input("North")).await.unwrap();
        let shelf = services.create_shelf(shelf_input(warehouse.warehouse.id, 2.0)).await.unwrap();
        let item = services
            .create_item(CreateItem {
                name: "Bolt".to_string(),
                sku: "BOLT-1".to_string(),
                quantity: 3,
                description: None,
                price: None,
                category: None,
                shelf_id: shelf.shelf.id,
            })
            .await
            .unwrap();

        let mut rx = services.changes().subscribe();
        services.delete_item(item.item.id).await.unwrap();
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.topic, "item.deleted");
        assert_eq!(notice.id, item.item.id.to_string());
        assert_eq!(notice.warehouse_id, Some(warehouse.warehouse.id));
    }

    #[tokio::test]
    async fn mutations_are_published() {
        let services = AppServices::in_memory();
        let mut rx = services.changes().subscribe();

        let created = services.create_warehouse(warehouse_input("North")).await.unwrap();
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.topic, "warehouse.created");
        assert_eq!(notice.id, created.warehouse.id.to_string());
        assert_eq!(notice.warehouse_id, Some(created.warehouse.id));
    }
}
