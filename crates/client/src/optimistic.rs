use tokio::sync::Mutex;

use shelfwise_core::ShelfId;
use shelfwise_inventory::{Shelf, UpdateShelf};

use crate::api::{ShelfApi, WarehouseSnapshot};
use crate::cache::WarehouseCache;
use crate::error::ClientError;

/// Patch a shelf optimistically.
///
/// The cache shows the patch before the request goes out, is rolled back if
/// the server refuses it, and is marked stale either way so the next read
/// refetches. The cache lock is not held across the request.
pub async fn update_shelf_optimistic(
    api: &dyn ShelfApi,
    cache: &Mutex<WarehouseCache>,
    id: ShelfId,
    patch: &UpdateShelf,
) -> Result<Shelf, ClientError> {
    let ctx = cache.lock().await.apply_optimistic(id, patch);

    let result = api.update_shelf(id, patch).await;

    let mut guard = cache.lock().await;
    if let Err(e) = &result {
        tracing::warn!(shelf_id = %id, error = %e, "shelf update rejected; rolling back");
        guard.rollback(ctx);
    }
    guard.invalidate();
    result
}

/// Refetch the default warehouse into the cache.
pub async fn refresh(api: &dyn ShelfApi, cache: &Mutex<WarehouseCache>) -> Result<WarehouseSnapshot, ClientError> {
    let view = api.default_warehouse().await?;
    cache.lock().await.replace(view.clone());
    Ok(view)
}
