//! Postgres-backed inventory store.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |----------------------|------------|----------|
//! | `23505` (unique violation) | `Conflict` | duplicate SKU, second default warehouse |
//! | `23503` (foreign key violation) | `NotFound` | parent warehouse or shelf is gone |
//! | `23514` (check violation) | `Domain(Validation)` | row failed a column check |
//! | `40P01` (deadlock detected) | `Conflict` | concurrent writers on the same shelf |
//! | other | `Database` | connectivity, pool closed, etc. |
//!
//! ## Locking
//!
//! Writes that change a shelf's load lock rows in a fixed order: the item being
//! changed (if any), then the shelf whose load is checked. Capacity is always
//! computed after the shelf row lock is held.
//!
//! A shelf insert or patch holds a share lock on the warehouse the shelf ends
//! up in while its footprint is checked (a patch locks the shelf row first).
//! A warehouse resize takes the warehouse row `FOR UPDATE` and only then reads
//! its shelves, so the two wait for each other and the bounds check always
//! sees committed geometry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::{instrument, Span};

use shelfwise_core::{DomainError, ItemId, ShelfId, WarehouseId};
use shelfwise_inventory::capacity::{self, MovePlan, SplitDestination};
use shelfwise_inventory::{Item, MoveItem, Shelf, UpdateItem, UpdateShelf, UpdateWarehouse, Warehouse};

use super::{InventoryStore, StoreError, StoreResult};

const SCHEMA: &str = include_str!("schema.sql");

const SELECT_WAREHOUSE: &str = r#"
    SELECT id, name, location, description, capacity, width, length, height,
           grid_size, is_default, created_at, updated_at
    FROM warehouses
"#;

const SELECT_SHELF: &str = r#"
    SELECT id, warehouse_id, name, location, capacity, position_x, position_y,
           position_z, width, depth, height, created_at, updated_at
    FROM shelves
"#;

const SELECT_ITEM: &str = r#"
    SELECT id, shelf_id, name, sku, description, quantity, price, category,
           created_at, updated_at
    FROM items
"#;

/// Postgres-backed store for warehouses, shelves and items.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: Arc<PgPool>,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a connection pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn begin(&self) -> StoreResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))
    }
}

async fn commit(tx: Transaction<'_, Postgres>) -> StoreResult<()> {
    tx.commit()
        .await
        .map_err(|e| map_sqlx_error("commit_transaction", e))
}

/// Row lock taken on a warehouse. A resize holds `Update`; shelf writes hold
/// `Share` so they serialize against a resize but not against each other.
#[derive(Debug, Clone, Copy)]
enum RowLock {
    Update,
    Share,
}

async fn lock_warehouse(tx: &mut Transaction<'_, Postgres>, id: WarehouseId, lock: RowLock) -> StoreResult<Warehouse> {
    let clause = match lock {
        RowLock::Update => "FOR UPDATE",
        RowLock::Share => "FOR SHARE",
    };
    let sql = format!("{SELECT_WAREHOUSE} WHERE id = $1 {clause}");
    let row = sqlx::query(&sql)
        .bind(id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_warehouse", e))?;
    row.as_ref()
        .map(decode_warehouse)
        .transpose()?
        .ok_or(StoreError::missing::<Warehouse>())
}

async fn lock_item(tx: &mut Transaction<'_, Postgres>, id: ItemId) -> StoreResult<Item> {
    let sql = format!("{SELECT_ITEM} WHERE id = $1 FOR UPDATE");
    let row = sqlx::query(&sql)
        .bind(id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_item", e))?;
    row.as_ref()
        .map(decode_item)
        .transpose()?
        .ok_or(StoreError::missing::<Item>())
}

async fn lock_shelf(tx: &mut Transaction<'_, Postgres>, id: ShelfId) -> StoreResult<Shelf> {
    let sql = format!("{SELECT_SHELF} WHERE id = $1 FOR UPDATE");
    let row = sqlx::query(&sql)
        .bind(id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_shelf", e))?;
    row.as_ref()
        .map(decode_shelf)
        .transpose()?
        .ok_or(StoreError::missing::<Shelf>())
}

async fn load_of(tx: &mut Transaction<'_, Postgres>, shelf_id: ShelfId, excluding: Option<ItemId>) -> StoreResult<i64> {
    let row = sqlx::query(
        r#"
        SELECT COALESCE(SUM(quantity), 0)::BIGINT AS load
        FROM items
        WHERE shelf_id = $1 AND ($2::uuid IS NULL OR id <> $2)
        "#,
    )
    .bind(shelf_id.as_uuid())
    .bind(excluding.map(|id| *id.as_uuid()))
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("shelf_load", e))?;

    row.try_get("load")
        .map_err(|e| StoreError::Database(format!("failed to read shelf load: {e}")))
}

async fn insert_item_row(tx: &mut Transaction<'_, Postgres>, item: &Item) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO items (
            id, shelf_id, name, sku, description, quantity, price, category,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(item.id.as_uuid())
    .bind(item.shelf_id.as_uuid())
    .bind(&item.name)
    .bind(&item.sku)
    .bind(&item.description)
    .bind(item.quantity)
    .bind(item.price)
    .bind(&item.category)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_item", e))?;
    Ok(())
}

async fn write_item(tx: &mut Transaction<'_, Postgres>, item: &Item) -> StoreResult<()> {
    sqlx::query(
        r#"
        UPDATE items
        SET shelf_id = $2, name = $3, sku = $4, description = $5, quantity = $6,
            price = $7, category = $8, updated_at = $9
        WHERE id = $1
        "#,
    )
    .bind(item.id.as_uuid())
    .bind(item.shelf_id.as_uuid())
    .bind(&item.name)
    .bind(&item.sku)
    .bind(&item.description)
    .bind(item.quantity)
    .bind(item.price)
    .bind(&item.category)
    .bind(item.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("update_item", e))?;
    Ok(())
}

#[async_trait::async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[instrument(skip(self), err)]
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(row_count = tracing::field::Empty), err)]
    async fn list_warehouses(&self) -> StoreResult<Vec<Warehouse>> {
        let sql = format!("{SELECT_WAREHOUSE} ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_warehouses", e))?;
        Span::current().record("row_count", rows.len());
        rows.iter().map(decode_warehouse).collect()
    }

    #[instrument(skip(self), fields(warehouse_id = %id), err)]
    async fn get_warehouse(&self, id: WarehouseId) -> StoreResult<Option<Warehouse>> {
        let sql = format!("{SELECT_WAREHOUSE} WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_warehouse", e))?;
        row.as_ref().map(decode_warehouse).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_default_warehouse(&self) -> StoreResult<Option<Warehouse>> {
        let sql = format!("{SELECT_WAREHOUSE} WHERE is_default LIMIT 1");
        let row = sqlx::query(&sql)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_default_warehouse", e))?;
        row.as_ref().map(decode_warehouse).transpose()
    }

    #[instrument(skip(self, warehouse), fields(warehouse_id = %warehouse.id), err)]
    async fn insert_warehouse(&self, warehouse: &Warehouse) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO warehouses (
                id, name, location, description, capacity, width, length, height,
                grid_size, is_default, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(warehouse.id.as_uuid())
        .bind(&warehouse.name)
        .bind(&warehouse.location)
        .bind(&warehouse.description)
        .bind(warehouse.capacity)
        .bind(warehouse.width)
        .bind(warehouse.length)
        .bind(warehouse.height)
        .bind(warehouse.grid_size)
        .bind(warehouse.is_default)
        .bind(warehouse.created_at)
        .bind(warehouse.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_warehouse", e))?;
        Ok(())
    }

    #[instrument(skip(self, patch), fields(warehouse_id = %id), err)]
    async fn update_warehouse(
        &self,
        id: WarehouseId,
        patch: &UpdateWarehouse,
        now: DateTime<Utc>,
    ) -> StoreResult<Warehouse> {
        let mut tx = self.begin().await?;
        let mut warehouse = lock_warehouse(&mut tx, id, RowLock::Update).await?;
        warehouse.apply(patch, now)?;

        if patch.resizes_floor() {
            let sql = format!("{SELECT_SHELF} WHERE warehouse_id = $1");
            let rows = sqlx::query(&sql)
                .bind(id.as_uuid())
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("shelves_of_warehouse", e))?;
            let bounds = warehouse.bounds();
            for row in &rows {
                decode_shelf(row)?.ensure_within(bounds)?;
            }
        }

        sqlx::query(
            r#"
            UPDATE warehouses
            SET name = $2, location = $3, description = $4, capacity = $5, width = $6,
                length = $7, height = $8, grid_size = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(&warehouse.name)
        .bind(&warehouse.location)
        .bind(&warehouse.description)
        .bind(warehouse.capacity)
        .bind(warehouse.width)
        .bind(warehouse.length)
        .bind(warehouse.height)
        .bind(warehouse.grid_size)
        .bind(warehouse.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_warehouse", e))?;

        commit(tx).await?;
        Ok(warehouse)
    }

    #[instrument(skip(self), fields(warehouse_id = %id), err)]
    async fn delete_warehouse(&self, id: WarehouseId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_warehouse", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::missing::<Warehouse>());
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_shelves(&self, warehouse_id: Option<WarehouseId>) -> StoreResult<Vec<Shelf>> {
        let sql = format!(
            "{SELECT_SHELF} WHERE ($1::uuid IS NULL OR warehouse_id = $1) ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(warehouse_id.map(|id| *id.as_uuid()))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_shelves", e))?;
        rows.iter().map(decode_shelf).collect()
    }

    #[instrument(skip(self), fields(shelf_id = %id), err)]
    async fn get_shelf(&self, id: ShelfId) -> StoreResult<Option<Shelf>> {
        let sql = format!("{SELECT_SHELF} WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_shelf", e))?;
        row.as_ref().map(decode_shelf).transpose()
    }

    #[instrument(skip(self, shelf), fields(shelf_id = %shelf.id), err)]
    async fn insert_shelf(&self, shelf: &Shelf) -> StoreResult<()> {
        let mut tx = self.begin().await?;
        let warehouse = lock_warehouse(&mut tx, shelf.warehouse_id, RowLock::Share).await?;
        shelf.ensure_within(warehouse.bounds())?;

        sqlx::query(
            r#"
            INSERT INTO shelves (
                id, warehouse_id, name, location, capacity, position_x, position_y,
                position_z, width, depth, height, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(shelf.id.as_uuid())
        .bind(shelf.warehouse_id.as_uuid())
        .bind(&shelf.name)
        .bind(&shelf.location)
        .bind(shelf.capacity)
        .bind(shelf.position_x)
        .bind(shelf.position_y)
        .bind(shelf.position_z)
        .bind(shelf.width)
        .bind(shelf.depth)
        .bind(shelf.height)
        .bind(shelf.created_at)
        .bind(shelf.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_shelf", e))?;
        commit(tx).await
    }

    #[instrument(skip(self, patch), fields(shelf_id = %id), err)]
    async fn update_shelf(&self, id: ShelfId, patch: &UpdateShelf, now: DateTime<Utc>) -> StoreResult<Shelf> {
        let mut tx = self.begin().await?;
        let mut shelf = lock_shelf(&mut tx, id).await?;
        shelf.apply(patch, now)?;

        let warehouse = lock_warehouse(&mut tx, shelf.warehouse_id, RowLock::Share).await?;
        if patch.touches_footprint() {
            shelf.ensure_within(warehouse.bounds())?;
        }
        let load = load_of(&mut tx, id, None).await?;
        capacity::ensure_capacity_covers_load(shelf.capacity, load)?;

        sqlx::query(
            r#"
            UPDATE shelves
            SET warehouse_id = $2, name = $3, location = $4, capacity = $5,
                position_x = $6, position_y = $7, position_z = $8,
                width = $9, depth = $10, height = $11, updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(shelf.warehouse_id.as_uuid())
        .bind(&shelf.name)
        .bind(&shelf.location)
        .bind(shelf.capacity)
        .bind(shelf.position_x)
        .bind(shelf.position_y)
        .bind(shelf.position_z)
        .bind(shelf.width)
        .bind(shelf.depth)
        .bind(shelf.height)
        .bind(shelf.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_shelf", e))?;

        commit(tx).await?;
        Ok(shelf)
    }

    #[instrument(skip(self), fields(shelf_id = %id), err)]
    async fn delete_shelf(&self, id: ShelfId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM shelves WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_shelf", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::missing::<Shelf>());
        }
        Ok(())
    }

    #[instrument(skip(self), fields(shelf_id = %id, deleted_items = tracing::field::Empty), err)]
    async fn clear_shelf(&self, id: ShelfId) -> StoreResult<u64> {
        let mut tx = self.begin().await?;
        lock_shelf(&mut tx, id).await?;
        let result = sqlx::query("DELETE FROM items WHERE shelf_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("clear_shelf", e))?;
        commit(tx).await?;

        Span::current().record("deleted_items", result.rows_affected());
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn list_items(&self, shelf_id: Option<ShelfId>) -> StoreResult<Vec<Item>> {
        let sql = format!("{SELECT_ITEM} WHERE ($1::uuid IS NULL OR shelf_id = $1) ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query(&sql)
            .bind(shelf_id.map(|id| *id.as_uuid()))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_items", e))?;
        rows.iter().map(decode_item).collect()
    }

    #[instrument(skip(self), fields(warehouse_id = %warehouse_id), err)]
    async fn list_items_in_warehouse(&self, warehouse_id: WarehouseId) -> StoreResult<Vec<Item>> {
        let sql = format!(
            "{SELECT_ITEM} WHERE shelf_id IN (SELECT id FROM shelves WHERE warehouse_id = $1) \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(warehouse_id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_items_in_warehouse", e))?;
        rows.iter().map(decode_item).collect()
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn get_item(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let sql = format!("{SELECT_ITEM} WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_item", e))?;
        row.as_ref().map(decode_item).transpose()
    }

    #[instrument(skip(self), err)]
    async fn get_item_by_sku(&self, sku: &str) -> StoreResult<Option<Item>> {
        let sql = format!("{SELECT_ITEM} WHERE sku = $1");
        let row = sqlx::query(&sql)
            .bind(sku)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_item_by_sku", e))?;
        row.as_ref().map(decode_item).transpose()
    }

    #[instrument(skip(self, item), fields(item_id = %item.id, shelf_id = %item.shelf_id), err)]
    async fn create_item(&self, item: &Item) -> StoreResult<()> {
        let mut tx = self.begin().await?;
        let shelf = lock_shelf(&mut tx, item.shelf_id).await?;
        let load = load_of(&mut tx, shelf.id, None).await?;
        capacity::ensure_fits(shelf.capacity, load, item.quantity)?;
        insert_item_row(&mut tx, item).await?;
        commit(tx).await
    }

    #[instrument(skip(self, patch), fields(item_id = %id), err)]
    async fn update_item(&self, id: ItemId, patch: &UpdateItem, now: DateTime<Utc>) -> StoreResult<Item> {
        let mut tx = self.begin().await?;
        let mut item = lock_item(&mut tx, id).await?;
        item.apply(patch, now)?;

        if patch.affects_load() {
            let shelf = lock_shelf(&mut tx, item.shelf_id).await?;
            let load = load_of(&mut tx, shelf.id, Some(id)).await?;
            capacity::ensure_fits(shelf.capacity, load, item.quantity)?;
        }

        write_item(&mut tx, &item).await?;
        commit(tx).await?;
        Ok(item)
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn delete_item(&self, id: ItemId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::missing::<Item>());
        }
        Ok(())
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn adjust_item_quantity(&self, id: ItemId, adjustment: i64, now: DateTime<Utc>) -> StoreResult<Item> {
        let mut tx = self.begin().await?;
        let mut item = lock_item(&mut tx, id).await?;
        let shelf = lock_shelf(&mut tx, item.shelf_id).await?;
        let other_load = load_of(&mut tx, shelf.id, Some(id)).await?;

        item.quantity = capacity::plan_adjustment(&item, &shelf, other_load, adjustment)?;
        item.updated_at = now;
        write_item(&mut tx, &item).await?;
        commit(tx).await?;
        Ok(item)
    }

    #[instrument(skip(self, input), fields(item_id = %id, target_shelf_id = %input.target_shelf_id), err)]
    async fn move_item(&self, id: ItemId, input: &MoveItem, now: DateTime<Utc>) -> StoreResult<Item> {
        input.validate()?;
        let mut tx = self.begin().await?;
        let mut item = lock_item(&mut tx, id).await?;
        let target = lock_shelf(&mut tx, input.target_shelf_id).await?;

        let sql = format!("{SELECT_ITEM} WHERE shelf_id = $1");
        let target_items = sqlx::query(&sql)
            .bind(target.id.as_uuid())
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("load_target_items", e))?
            .iter()
            .map(decode_item)
            .collect::<StoreResult<Vec<Item>>>()?;

        let moved = match capacity::plan_move(&item, &target, &target_items, input.quantity, now)? {
            MovePlan::Relocate => {
                item.shelf_id = target.id;
                item.updated_at = now;
                write_item(&mut tx, &item).await?;
                item
            }
            MovePlan::Split {
                moved,
                remaining,
                destination,
            } => {
                let destination_item = match destination {
                    SplitDestination::MergeInto { item_id, .. } => {
                        // Increment in place so a concurrent rename of the
                        // destination row is not overwritten.
                        let row = sqlx::query(
                            r#"
                            UPDATE items
                            SET quantity = quantity + $2, updated_at = $3
                            WHERE id = $1
                            RETURNING id, shelf_id, name, sku, description, quantity, price,
                                      category, created_at, updated_at
                            "#,
                        )
                        .bind(item_id.as_uuid())
                        .bind(moved)
                        .bind(now)
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(|e| map_sqlx_error("merge_split_item", e))?;
                        decode_item(&row)?
                    }
                    SplitDestination::Create { sku } => {
                        let split = Item {
                            id: ItemId::new(),
                            shelf_id: target.id,
                            sku,
                            quantity: moved,
                            created_at: now,
                            updated_at: now,
                            ..item.clone()
                        };
                        insert_item_row(&mut tx, &split).await?;
                        split
                    }
                };

                item.quantity = remaining;
                item.updated_at = now;
                write_item(&mut tx, &item).await?;
                destination_item
            }
        };

        commit(tx).await?;
        Ok(moved)
    }
}

// SQLx row types

struct WarehouseRow(Warehouse);

impl<'r> FromRow<'r, PgRow> for WarehouseRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Warehouse {
            id: WarehouseId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            location: row.try_get("location")?,
            description: row.try_get("description")?,
            capacity: row.try_get("capacity")?,
            width: row.try_get("width")?,
            length: row.try_get("length")?,
            height: row.try_get("height")?,
            grid_size: row.try_get("grid_size")?,
            is_default: row.try_get("is_default")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

struct ShelfRow(Shelf);

impl<'r> FromRow<'r, PgRow> for ShelfRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Shelf {
            id: ShelfId::from_uuid(row.try_get("id")?),
            warehouse_id: WarehouseId::from_uuid(row.try_get("warehouse_id")?),
            name: row.try_get("name")?,
            location: row.try_get("location")?,
            capacity: row.try_get("capacity")?,
            position_x: row.try_get("position_x")?,
            position_y: row.try_get("position_y")?,
            position_z: row.try_get("position_z")?,
            width: row.try_get("width")?,
            depth: row.try_get("depth")?,
            height: row.try_get("height")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

struct ItemRow(Item);

impl<'r> FromRow<'r, PgRow> for ItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Item {
            id: ItemId::from_uuid(row.try_get("id")?),
            shelf_id: ShelfId::from_uuid(row.try_get("shelf_id")?),
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            description: row.try_get("description")?,
            quantity: row.try_get("quantity")?,
            price: row.try_get("price")?,
            category: row.try_get("category")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

fn decode_error(kind: &str, err: sqlx::Error) -> StoreError {
    StoreError::Database(format!("failed to decode {kind} row: {err}"))
}

fn decode_warehouse(row: &PgRow) -> StoreResult<Warehouse> {
    WarehouseRow::from_row(row)
        .map(|r| r.0)
        .map_err(|e| decode_error("warehouse", e))
}

fn decode_shelf(row: &PgRow) -> StoreResult<Shelf> {
    ShelfRow::from_row(row).map(|r| r.0).map_err(|e| decode_error("shelf", e))
}

fn decode_item(row: &PgRow) -> StoreResult<Item> {
    ItemRow::from_row(row).map(|r| r.0).map_err(|e| decode_error("item", e))
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or_default();
            match db_err.code().as_deref() {
                Some("23505") => match constraint {
                    "items_sku_key" => StoreError::duplicate_sku(),
                    "warehouses_single_default" => {
                        StoreError::Conflict("a default warehouse already exists".to_string())
                    }
                    _ => StoreError::Conflict(format!("duplicate record in {operation}: {}", db_err.message())),
                },
                Some("23503") => match constraint {
                    "shelves_warehouse_id_fkey" => StoreError::missing::<Warehouse>(),
                    "items_shelf_id_fkey" => StoreError::missing::<Shelf>(),
                    _ => StoreError::Database(format!("database error in {operation}: {}", db_err.message())),
                },
                Some("23514") => StoreError::Domain(DomainError::validation(format!(
                    "value rejected by check constraint {constraint}"
                ))),
                Some("40P01") => StoreError::Conflict(format!("concurrent update in {operation}, retry the request")),
                _ => StoreError::Database(format!("database error in {operation}: {}", db_err.message())),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Database(format!("connection pool closed in {operation}")),
        other => StoreError::Database(format!("sqlx error in {operation}: {other}")),
    }
}
