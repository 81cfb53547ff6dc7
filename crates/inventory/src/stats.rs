//! Utilisation statistics for warehouses and shelves.

use serde::{Deserialize, Serialize};

use shelfwise_core::{ShelfId, WarehouseId};

use crate::capacity::shelf_load;
use crate::item::Item;
use crate::shelf::Shelf;
use crate::warehouse::Warehouse;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseStatistics {
    pub id: WarehouseId,
    pub name: String,
    pub total_shelves: usize,
    pub total_items: usize,
    pub total_quantity: i64,
    pub capacity: i64,
    pub utilization_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfStatistics {
    pub id: ShelfId,
    pub name: String,
    pub warehouse_id: WarehouseId,
    pub total_items: usize,
    pub total_quantity: i64,
    pub capacity: i64,
    pub utilization_percentage: f64,
}

pub fn utilization(load: i64, capacity: i64) -> f64 {
    if capacity > 0 {
        load as f64 / capacity as f64 * 100.0
    } else {
        0.0
    }
}

impl WarehouseStatistics {
    /// `items` may contain items from other warehouses; only those on `shelves` count.
    pub fn compute(warehouse: &Warehouse, shelves: &[Shelf], items: &[Item]) -> Self {
        let shelves: Vec<&Shelf> = shelves.iter().filter(|s| s.warehouse_id == warehouse.id).collect();
        let stocked: Vec<&Item> = items
            .iter()
            .filter(|i| shelves.iter().any(|s| s.id == i.shelf_id))
            .collect();
        let total_quantity = shelf_load(stocked.iter().copied());

        Self {
            id: warehouse.id,
            name: warehouse.name.clone(),
            total_shelves: shelves.len(),
            total_items: stocked.len(),
            total_quantity,
            capacity: warehouse.capacity,
            utilization_percentage: utilization(total_quantity, warehouse.capacity),
        }
    }
}

impl ShelfStatistics {
    pub fn compute(shelf: &Shelf, items: &[Item]) -> Self {
        let on_shelf: Vec<&Item> = items.iter().filter(|i| i.shelf_id == shelf.id).collect();
        let total_quantity = shelf_load(on_shelf.iter().copied());

        Self {
            id: shelf.id,
            name: shelf.name.clone(),
            warehouse_id: shelf.warehouse_id,
            total_items: on_shelf.len(),
            total_quantity,
            capacity: shelf.capacity,
            utilization_percentage: utilization(total_quantity, shelf.capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use shelfwise_core::ItemId;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn warehouse(capacity: i64) -> Warehouse {
        let mut w = Warehouse::new_default(WarehouseId::new(), test_time());
        w.capacity = capacity;
        w
    }

    fn shelf(warehouse_id: WarehouseId, capacity: i64) -> Shelf {
        Shelf {
            id: ShelfId::new(),
            warehouse_id,
            name: "A1".to_string(),
            location: "Aisle A".to_string(),
            capacity,
            position_x: 0.5,
            position_y: 0.0,
            position_z: 0.5,
            width: 1.0,
            depth: 1.0,
            height: 2.0,
            created_at: test_time(),
            updated_at: test_time(),
        }
    }

    fn item(shelf_id: ShelfId, quantity: i64) -> Item {
        Item {
            id: ItemId::new(),
            shelf_id,
            name: "Widget".to_string(),
            sku: format!("SKU-{quantity}"),
            description: None,
            quantity,
            price: 0.0,
            category: "General".to_string(),
            created_at: test_time(),
            updated_at: test_time(),
        }
    }

    #[test]
    fn warehouse_statistics_ignore_foreign_items() {
        let w = warehouse(1000);
        let a = shelf(w.id, 100);
        let b = shelf(w.id, 100);
        let elsewhere = shelf(WarehouseId::new(), 100);
        let items = vec![item(a.id, 25), item(a.id, 25), item(b.id, 50), item(elsewhere.id, 999)];

        let stats = WarehouseStatistics::compute(&w, &[a, b, elsewhere], &items);
        assert_eq!(stats.total_shelves, 2);
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.total_quantity, 100);
        assert!((stats.utilization_percentage - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shelf_statistics_for_empty_shelf() {
        let s = shelf(WarehouseId::new(), 40);
        let stats = ShelfStatistics::compute(&s, &[]);
        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.total_quantity, 0);
        assert_eq!(stats.utilization_percentage, 0.0);
    }

    #[test]
    fn utilization_is_zero_without_capacity() {
        assert_eq!(utilization(10, 0), 0.0);
        assert_eq!(utilization(1, 4), 25.0);
    }

    #[test]
    fn statistics_serialize_camel_case() {
        let s = shelf(WarehouseId::new(), 40);
        let json = serde_json::to_value(ShelfStatistics::compute(&s, &[])).unwrap();
        assert!(json.get("utilizationPercentage").is_some());
        assert!(json.get("warehouseId").is_some());
    }
}
