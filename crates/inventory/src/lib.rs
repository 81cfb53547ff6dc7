//! Warehouse inventory domain.
//!
//! This crate contains the business rules for warehouses, shelves and items,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod capacity;
pub mod item;
pub mod layout;
pub mod search;
pub mod shelf;
pub mod stats;
pub mod warehouse;

mod validate;

pub use capacity::{MovePlan, SplitDestination};
pub use item::{AdjustQuantity, CreateItem, Item, MoveItem, UpdateItem};
pub use layout::{Bounds, DragKind, DragSession, Footprint, Viewport};
pub use shelf::{CreateShelf, Shelf, UpdateShelf};
pub use stats::{ShelfStatistics, WarehouseStatistics};
pub use warehouse::{CreateWarehouse, DefaultWarehouse, UpdateWarehouse, Warehouse};
