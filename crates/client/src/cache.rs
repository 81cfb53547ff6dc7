//! Client-side copy of the default warehouse view.

use shelfwise_core::ShelfId;
use shelfwise_inventory::{Shelf, UpdateShelf};

use crate::api::WarehouseSnapshot;

/// What [`WarehouseCache::rollback`] needs to undo an optimistic write.
#[derive(Debug, Clone)]
pub struct MutationContext {
    previous: Option<WarehouseSnapshot>,
}

#[derive(Debug, Default)]
pub struct WarehouseCache {
    view: Option<WarehouseSnapshot>,
    stale: bool,
}

impl WarehouseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly fetched view.
    pub fn replace(&mut self, view: WarehouseSnapshot) {
        self.view = Some(view);
        self.stale = false;
    }

    pub fn view(&self) -> Option<&WarehouseSnapshot> {
        self.view.as_ref()
    }

    pub fn shelf(&self, id: ShelfId) -> Option<&Shelf> {
        self.view
            .as_ref()?
            .shelves
            .iter()
            .map(|s| &s.shelf)
            .find(|s| s.id == id)
    }

    /// True once a write settled and the view should be refetched.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Merge `patch` into the cached shelf right away and remember the old view.
    ///
    /// A patch the domain would reject leaves the shelf as is; the server
    /// answer decides. A shelf moved to another warehouse leaves this view.
    pub fn apply_optimistic(&mut self, id: ShelfId, patch: &UpdateShelf) -> MutationContext {
        let previous = self.view.clone();

        if let Some(view) = self.view.as_mut() {
            let warehouse_id = view.warehouse.id;
            if let Some(entry) = view.shelves.iter_mut().find(|s| s.shelf.id == id) {
                let updated_at = entry.shelf.updated_at;
                if let Err(e) = entry.shelf.apply(patch, updated_at) {
                    tracing::debug!(shelf_id = %id, error = %e, "optimistic patch not applied locally");
                }
            }
            view.shelves.retain(|s| s.shelf.warehouse_id == warehouse_id);
        }

        MutationContext { previous }
    }

    /// Restore the view captured by `apply_optimistic`.
    ///
    /// Restores the whole snapshot, so overlapping optimistic writes are undone too.
    pub fn rollback(&mut self, ctx: MutationContext) {
        if let Some(previous) = ctx.previous {
            self.view = Some(previous);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::ShelfSnapshot;
    use chrono::{TimeZone, Utc};
    use shelfwise_core::WarehouseId;
    use shelfwise_inventory::{CreateShelf, Warehouse};

    pub(crate) fn snapshot() -> WarehouseSnapshot {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let warehouse = Warehouse::new_default(WarehouseId::new(), now);
        let shelf = Shelf::new(
            ShelfId::new(),
            CreateShelf {
                name: "A1".to_string(),
                location: "Aisle A".to_string(),
                capacity: 100,
                warehouse_id: warehouse.id,
                position_x: Some(2.0),
                position_y: None,
                position_z: Some(2.0),
                width: None,
                depth: None,
                height: None,
            },
            now,
        )
        .unwrap();
        WarehouseSnapshot {
            warehouse,
            shelves: vec![ShelfSnapshot { shelf, item_count: 3 }],
        }
    }

    #[test]
    fn optimistic_patch_then_rollback() {
        let view = snapshot();
        let id = view.shelves[0].shelf.id;
        let mut cache = WarehouseCache::new();
        cache.replace(view.clone());

        let ctx = cache.apply_optimistic(
            id,
            &UpdateShelf {
                position_x: Some(7.0),
                ..Default::default()
            },
        );
        assert_eq!(cache.shelf(id).unwrap().position_x, 7.0);
        assert_eq!(cache.view().unwrap().shelves[0].item_count, 3);

        cache.rollback(ctx);
        assert_eq!(cache.view(), Some(&view));
    }

    #[test]
    fn invalid_patch_leaves_shelf_untouched() {
        let view = snapshot();
        let id = view.shelves[0].shelf.id;
        let mut cache = WarehouseCache::new();
        cache.replace(view.clone());

        cache.apply_optimistic(
            id,
            &UpdateShelf {
                capacity: Some(-1),
                ..Default::default()
            },
        );
        assert_eq!(cache.view(), Some(&view));
    }

    #[test]
    fn moving_shelf_elsewhere_drops_it_from_view() {
        let view = snapshot();
        let id = view.shelves[0].shelf.id;
        let mut cache = WarehouseCache::new();
        cache.replace(view);

        cache.apply_optimistic(
            id,
            &UpdateShelf {
                warehouse_id: Some(WarehouseId::new()),
                ..Default::default()
            },
        );
        assert!(cache.shelf(id).is_none());
    }

    #[test]
    fn replace_clears_stale_flag() {
        let mut cache = WarehouseCache::new();
        cache.invalidate();
        assert!(cache.is_stale());
        cache.replace(snapshot());
        assert!(!cache.is_stale());
    }
}
