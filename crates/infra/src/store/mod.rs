//! Persistence for warehouses, shelves and items.
//!
//! Every write that can break a cross-record rule (shelf capacity, unique SKU,
//! parent existence, shelf inside its warehouse) is a single store operation, so each backend can enforce
//! the rule inside one lock or transaction.

mod in_memory;
mod postgres;

use chrono::{DateTime, Utc};
use thiserror::Error;

use shelfwise_core::{DomainError, Entity, ItemId, ShelfId, WarehouseId};
use shelfwise_inventory::{Item, MoveItem, Shelf, UpdateItem, UpdateShelf, UpdateWarehouse, Warehouse};

pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    /// `NotFound` named after the entity type.
    pub fn missing<E: Entity>() -> Self {
        Self::NotFound(E::KIND)
    }

    pub fn duplicate_sku() -> Self {
        Self::Conflict("Item with this SKU already exists".to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage for the inventory hierarchy.
///
/// Lists are returned newest first. Deleting a warehouse removes its shelves
/// and their items; deleting a shelf removes its items.
#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    /// Round-trip to the backing storage.
    async fn ping(&self) -> StoreResult<()>;

    async fn list_warehouses(&self) -> StoreResult<Vec<Warehouse>>;
    async fn get_warehouse(&self, id: WarehouseId) -> StoreResult<Option<Warehouse>>;
    async fn find_default_warehouse(&self) -> StoreResult<Option<Warehouse>>;
    /// Fails with `Conflict` when a second default warehouse would be created.
    async fn insert_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()>;
    /// Apply a patch atomically. A resize is refused while any shelf of the
    /// warehouse would end up outside the new floor plan.
    async fn update_warehouse(
        &self,
        id: WarehouseId,
        patch: &UpdateWarehouse,
        now: DateTime<Utc>,
    ) -> StoreResult<Warehouse>;
    async fn delete_warehouse(&self, id: WarehouseId) -> StoreResult<()>;

    async fn list_shelves(&self, warehouse_id: Option<WarehouseId>) -> StoreResult<Vec<Shelf>>;
    async fn get_shelf(&self, id: ShelfId) -> StoreResult<Option<Shelf>>;
    /// Fails with `NotFound("Warehouse")` when the parent is missing and with an
    /// invariant violation when the footprint leaves its floor plan.
    async fn insert_shelf(&self, shelf: &Shelf) -> StoreResult<()>;
    /// Apply a patch atomically: the footprint is checked against the bounds of
    /// the (possibly new) warehouse and the capacity against the current load.
    async fn update_shelf(&self, id: ShelfId, patch: &UpdateShelf, now: DateTime<Utc>) -> StoreResult<Shelf>;
    async fn delete_shelf(&self, id: ShelfId) -> StoreResult<()>;
    /// Delete every item on the shelf; returns how many were removed.
    async fn clear_shelf(&self, id: ShelfId) -> StoreResult<u64>;

    async fn list_items(&self, shelf_id: Option<ShelfId>) -> StoreResult<Vec<Item>>;
    async fn list_items_in_warehouse(&self, warehouse_id: WarehouseId) -> StoreResult<Vec<Item>>;
    async fn get_item(&self, id: ItemId) -> StoreResult<Option<Item>>;
    async fn get_item_by_sku(&self, sku: &str) -> StoreResult<Option<Item>>;
    /// Checks shelf existence, SKU uniqueness and shelf capacity atomically.
    async fn create_item(&self, item: &Item) -> StoreResult<()>;
    async fn update_item(&self, id: ItemId, patch: &UpdateItem, now: DateTime<Utc>) -> StoreResult<Item>;
    async fn delete_item(&self, id: ItemId) -> StoreResult<()>;
    async fn adjust_item_quantity(&self, id: ItemId, adjustment: i64, now: DateTime<Utc>) -> StoreResult<Item>;
    /// Returns the item that holds the moved stock on the target shelf.
    async fn move_item(&self, id: ItemId, input: &MoveItem, now: DateTime<Utc>) -> StoreResult<Item>;
}
