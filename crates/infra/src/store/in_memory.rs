use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use shelfwise_core::{ItemId, ShelfId, WarehouseId};
use shelfwise_inventory::capacity::{self, MovePlan, SplitDestination};
use shelfwise_inventory::{Item, MoveItem, Shelf, UpdateItem, UpdateShelf, UpdateWarehouse, Warehouse};

use super::{InventoryStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    warehouses: HashMap<WarehouseId, Warehouse>,
    shelves: HashMap<ShelfId, Shelf>,
    items: HashMap<ItemId, Item>,
}

impl Tables {
    fn load(&self, shelf_id: ShelfId, excluding: Option<ItemId>) -> i64 {
        capacity::shelf_load(
            self.items
                .values()
                .filter(|i| i.shelf_id == shelf_id && Some(i.id) != excluding),
        )
    }

    fn sku_taken(&self, sku: &str, excluding: Option<ItemId>) -> bool {
        self.items.values().any(|i| i.sku == sku && Some(i.id) != excluding)
    }

    fn warehouse(&self, id: WarehouseId) -> StoreResult<Warehouse> {
        self.warehouses.get(&id).cloned().ok_or(StoreError::missing::<Warehouse>())
    }

    fn shelf(&self, id: ShelfId) -> StoreResult<&Shelf> {
        self.shelves.get(&id).ok_or(StoreError::missing::<Shelf>())
    }

    fn item(&self, id: ItemId) -> StoreResult<Item> {
        self.items.get(&id).cloned().ok_or(StoreError::missing::<Item>())
    }

    fn other_default(&self, warehouse: &Warehouse) -> bool {
        warehouse.is_default
            && self
                .warehouses
                .values()
                .any(|w| w.is_default && w.id != warehouse.id)
    }
}

fn newest_first<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.sort_by_key(|row| Reverse(key(row)));
    rows
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Database("in-memory store lock poisoned".to_string())
}

/// In-memory inventory store for tests/dev.
///
/// Each operation takes the lock once, so compound writes (capacity check plus
/// insert, patch plus bounds check, cascading deletes, moves) are atomic with
/// respect to each other.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.inner.read().map_err(poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.inner.write().map_err(poisoned)
    }
}

#[async_trait::async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }

    async fn list_warehouses(&self) -> StoreResult<Vec<Warehouse>> {
        let tables = self.read()?;
        let rows = tables.warehouses.values().cloned().collect();
        Ok(newest_first(rows, |w: &Warehouse| (w.created_at, w.id)))
    }

    async fn get_warehouse(&self, id: WarehouseId) -> StoreResult<Option<Warehouse>> {
        Ok(self.read()?.warehouses.get(&id).cloned())
    }

    async fn find_default_warehouse(&self) -> StoreResult<Option<Warehouse>> {
        Ok(self.read()?.warehouses.values().find(|w| w.is_default).cloned())
    }

    async fn insert_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.warehouses.contains_key(&warehouse.id) {
            return Err(StoreError::Conflict(format!("warehouse {} already exists", warehouse.id)));
        }
        if tables.other_default(warehouse) {
            return Err(StoreError::Conflict("a default warehouse already exists".to_string()));
        }
        tables.warehouses.insert(warehouse.id, warehouse.clone());
        Ok(())
    }

    async fn update_warehouse(
        &self,
        id: WarehouseId,
        patch: &UpdateWarehouse,
        now: DateTime<Utc>,
    ) -> StoreResult<Warehouse> {
        let mut tables = self.write()?;
        let mut warehouse = tables.warehouse(id)?;
        warehouse.apply(patch, now)?;

        if patch.resizes_floor() {
            let bounds = warehouse.bounds();
            for shelf in tables.shelves.values().filter(|s| s.warehouse_id == id) {
                shelf.ensure_within(bounds)?;
            }
        }

        tables.warehouses.insert(id, warehouse.clone());
        Ok(warehouse)
    }

    async fn delete_warehouse(&self, id: WarehouseId) -> StoreResult<()> {
        let mut tables = self.write()?;
        tables.warehouses.remove(&id).ok_or(StoreError::missing::<Warehouse>())?;

        let shelf_ids: Vec<ShelfId> = tables
            .shelves
            .values()
            .filter(|s| s.warehouse_id == id)
            .map(|s| s.id)
            .collect();
        tables.shelves.retain(|_, s| s.warehouse_id != id);
        tables.items.retain(|_, i| !shelf_ids.contains(&i.shelf_id));
        Ok(())
    }

    async fn list_shelves(&self, warehouse_id: Option<WarehouseId>) -> StoreResult<Vec<Shelf>> {
        let tables = self.read()?;
        let rows = tables
            .shelves
            .values()
            .filter(|s| warehouse_id.is_none_or(|w| s.warehouse_id == w))
            .cloned()
            .collect();
        Ok(newest_first(rows, |s: &Shelf| (s.created_at, s.id)))
    }

    async fn get_shelf(&self, id: ShelfId) -> StoreResult<Option<Shelf>> {
        Ok(self.read()?.shelves.get(&id).cloned())
    }

    async fn insert_shelf(&self, shelf: &Shelf) -> StoreResult<()> {
        let mut tables = self.write()?;
        shelf.ensure_within(tables.warehouse(shelf.warehouse_id)?.bounds())?;
        if tables.shelves.contains_key(&shelf.id) {
            return Err(StoreError::Conflict(format!("shelf {} already exists", shelf.id)));
        }
        tables.shelves.insert(shelf.id, shelf.clone());
        Ok(())
    }

    async fn update_shelf(&self, id: ShelfId, patch: &UpdateShelf, now: DateTime<Utc>) -> StoreResult<Shelf> {
        let mut tables = self.write()?;
        let mut shelf = tables.shelf(id)?.clone();
        shelf.apply(patch, now)?;

        let bounds = tables.warehouse(shelf.warehouse_id)?.bounds();
        if patch.touches_footprint() {
            shelf.ensure_within(bounds)?;
        }
        capacity::ensure_capacity_covers_load(shelf.capacity, tables.load(id, None))?;

        tables.shelves.insert(id, shelf.clone());
        Ok(shelf)
    }

    async fn delete_shelf(&self, id: ShelfId) -> StoreResult<()> {
        let mut tables = self.write()?;
        tables.shelves.remove(&id).ok_or(StoreError::missing::<Shelf>())?;
        tables.items.retain(|_, i| i.shelf_id != id);
        Ok(())
    }

    async fn clear_shelf(&self, id: ShelfId) -> StoreResult<u64> {
        let mut tables = self.write()?;
        tables.shelf(id)?;
        let before = tables.items.len();
        tables.items.retain(|_, i| i.shelf_id != id);
        Ok((before - tables.items.len()) as u64)
    }

    async fn list_items(&self, shelf_id: Option<ShelfId>) -> StoreResult<Vec<Item>> {
        let tables = self.read()?;
        let rows = tables
            .items
            .values()
            .filter(|i| shelf_id.is_none_or(|s| i.shelf_id == s))
            .cloned()
            .collect();
        Ok(newest_first(rows, |i: &Item| (i.created_at, i.id)))
    }

    async fn list_items_in_warehouse(&self, warehouse_id: WarehouseId) -> StoreResult<Vec<Item>> {
        let tables = self.read()?;
        let rows = tables
            .items
            .values()
            .filter(|i| {
                tables
                    .shelves
                    .get(&i.shelf_id)
                    .is_some_and(|s| s.warehouse_id == warehouse_id)
            })
            .cloned()
            .collect();
        Ok(newest_first(rows, |i: &Item| (i.created_at, i.id)))
    }

    async fn get_item(&self, id: ItemId) -> StoreResult<Option<Item>> {
        Ok(self.read()?.items.get(&id).cloned())
    }

    async fn get_item_by_sku(&self, sku: &str) -> StoreResult<Option<Item>> {
        Ok(self.read()?.items.values().find(|i| i.sku == sku).cloned())
    }

    async fn create_item(&self, item: &Item) -> StoreResult<()> {
        let mut tables = self.write()?;
        let shelf_capacity = tables.shelf(item.shelf_id)?.capacity;
        if tables.sku_taken(&item.sku, None) {
            return Err(StoreError::duplicate_sku());
        }
        capacity::ensure_fits(shelf_capacity, tables.load(item.shelf_id, None), item.quantity)?;
        tables.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn update_item(&self, id: ItemId, patch: &UpdateItem, now: DateTime<Utc>) -> StoreResult<Item> {
        let mut tables = self.write()?;
        let mut item = tables.item(id)?;
        item.apply(patch, now)?;

        if patch.sku.is_some() && tables.sku_taken(&item.sku, Some(id)) {
            return Err(StoreError::duplicate_sku());
        }
        if patch.affects_load() {
            let shelf_capacity = tables.shelf(item.shelf_id)?.capacity;
            capacity::ensure_fits(shelf_capacity, tables.load(item.shelf_id, Some(id)), item.quantity)?;
        }

        tables.items.insert(id, item.clone());
        Ok(item)
    }

    async fn delete_item(&self, id: ItemId) -> StoreResult<()> {
        let mut tables = self.write()?;
        tables.items.remove(&id).ok_or(StoreError::missing::<Item>())?;
        Ok(())
    }

    async fn adjust_item_quantity(&self, id: ItemId, adjustment: i64, now: DateTime<Utc>) -> StoreResult<Item> {
        let mut tables = self.write()?;
        let mut item = tables.item(id)?;
        let shelf = tables.shelf(item.shelf_id)?;
        let other_load = tables.load(item.shelf_id, Some(id));

        item.quantity = capacity::plan_adjustment(&item, shelf, other_load, adjustment)?;
        item.updated_at = now;
        tables.items.insert(id, item.clone());
        Ok(item)
    }

    async fn move_item(&self, id: ItemId, input: &MoveItem, now: DateTime<Utc>) -> StoreResult<Item> {
        input.validate()?;
        let mut tables = self.write()?;
        let mut item = tables.item(id)?;
        let target = tables.shelf(input.target_shelf_id)?.clone();
        let target_items: Vec<Item> = tables
            .items
            .values()
            .filter(|i| i.shelf_id == target.id)
            .cloned()
            .collect();

        match capacity::plan_move(&item, &target, &target_items, input.quantity, now)? {
            MovePlan::Relocate => {
                item.shelf_id = target.id;
                item.updated_at = now;
                tables.items.insert(id, item.clone());
                Ok(item)
            }
            MovePlan::Split {
                moved,
                remaining,
                destination,
            } => {
                let moved_item = match destination {
                    SplitDestination::MergeInto { item_id, quantity } => {
                        let mut existing = tables.item(item_id)?;
                        existing.quantity = quantity;
                        existing.updated_at = now;
                        existing
                    }
                    SplitDestination::Create { sku } => {
                        if tables.sku_taken(&sku, None) {
                            return Err(StoreError::duplicate_sku());
                        }
                        Item {
                            id: ItemId::new(),
                            shelf_id: target.id,
                            sku,
                            quantity: moved,
                            created_at: now,
                            updated_at: now,
                            ..item.clone()
                        }
                    }
                };

                item.quantity = remaining;
                item.updated_at = now;
                tables.items.insert(id, item);
                tables.items.insert(moved_item.id, moved_item.clone());
                Ok(moved_item)
            }
        }
    }
}
